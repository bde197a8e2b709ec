use diesel::prelude::*;

use crate::schema::trade_histories;

/// 成交/委托历史，只追加不修改
#[derive(Queryable, Debug, Clone)]
pub struct TradeHistory {
    pub item_cd: String,
    pub trade_date: String,
    pub trade_hour: String,
    pub trade_type: String,
    pub trade_count: i32,
    pub trade_price: i32,
    pub rmk: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = trade_histories)]
pub struct NewTradeHistory {
    pub item_cd: String,
    pub trade_date: String,
    pub trade_hour: String,
    pub trade_type: String,
    pub trade_count: i32,
    pub trade_price: i32,
    pub rmk: String,
}
