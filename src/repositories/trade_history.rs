use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};

use crate::models::{NewTradeHistory, TradeHistory};
use crate::schema::trade_histories::dsl::*;

pub type PgPoolConn = PooledConnection<ConnectionManager<PgConnection>>;

pub fn append(conn: &mut PgPoolConn, new_rec: &NewTradeHistory) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(trade_histories).values(new_rec).execute(conn)
}

/// 当日最近一笔买入委托（type = 'B'），用于一天一次的买入去重
pub fn find_bought(
    conn: &mut PgPoolConn,
    code: &str,
    date: &str,
) -> Result<Option<TradeHistory>, diesel::result::Error> {
    trade_histories
        .filter(item_cd.eq(code))
        .filter(trade_date.eq(date))
        .filter(trade_type.eq("B"))
        .order(trade_hour.desc())
        .first(conn)
        .optional()
}
