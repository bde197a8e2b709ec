use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::schema::tickers;

#[derive(Queryable, Debug, Clone)]
pub struct Ticker {
    pub item_cd: String,
    pub mrkt_ctg: String,
    pub itms_nm: String,
    pub corp_nm: String,
    pub sector: String,
    pub created_date: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = tickers)]
pub struct NewTicker {
    pub item_cd: String,
    pub mrkt_ctg: String,
    pub itms_nm: String,
    pub corp_nm: String,
    pub sector: String,
    pub created_date: NaiveDateTime,
}
