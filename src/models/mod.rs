pub mod tickers;
pub mod equity_snapshots;
pub mod price_bars;
pub mod sheets;
pub mod score_cards;
pub mod trade_infos;
pub mod trade_statuses;
pub mod trade_histories;

pub use tickers::{NewTicker, Ticker};
pub use equity_snapshots::NewEquitySnapshot;
pub use price_bars::{MaUpdate, NewPriceBar, PriceBar};
pub use sheets::{NewBalanceSheet, NewEtcSheet, NewIncomeSheet, NewProfitSheet, NewRatioSheet};
pub use score_cards::NewScoreCard;
pub use trade_infos::{NewTradeInfo, PivotUpdate, PossibilityUpdate, PriceUpdate, TradeInfo};
pub use trade_statuses::{NewTradeStatus, TradeDirection, TradeStatus};
pub use trade_histories::{NewTradeHistory, TradeHistory};
