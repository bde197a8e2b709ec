pub mod ticker;
pub mod equity_snapshot;
pub mod price_bar;
pub mod sheet;
pub mod score_card;
pub mod trade_info;
pub mod trade_status;
pub mod trade_history;
pub mod swing_view;
