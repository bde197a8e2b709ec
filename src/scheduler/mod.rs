pub mod market_ingest_job;
pub mod scoring_job;
pub mod trading_job;
pub mod universe_sync_job;
