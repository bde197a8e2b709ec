pub mod ingest_service;
pub mod ma_service;
pub mod notify_service;
pub mod scorer_service;
pub mod trade_info_service;
pub mod universe_service;
pub mod worker_service;
