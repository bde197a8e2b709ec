use diesel::prelude::*;

use crate::schema::trade_statuses;

/// 买卖状态机的两个档位。wire 值 "BS"/"SS" 与 DB 列保持一致。
/// BS = 买入后持有（buy-stop），SS = 卖出后观望（sell-stop）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeDirection {
    BoughtStop,
    SoldStop,
}

impl TradeDirection {
    pub fn as_code(self) -> &'static str {
        match self {
            TradeDirection::BoughtStop => "BS",
            TradeDirection::SoldStop => "SS",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "BS" => Some(TradeDirection::BoughtStop),
            "SS" => Some(TradeDirection::SoldStop),
            _ => None,
        }
    }
}

#[derive(Queryable, Debug, Clone)]
pub struct TradeStatus {
    pub item_cd: String,
    pub trade_date: String,
    pub trade_type: String,
    pub odno: String,
    pub qty: i32,
    pub trade_price: i32,
    pub trade_time: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = trade_statuses)]
pub struct NewTradeStatus {
    pub item_cd: String,
    pub trade_date: String,
    pub trade_type: String,
    pub odno: String,
    pub qty: i32,
    pub trade_price: i32,
    pub trade_time: String,
}
