use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};

use crate::models::{NewTradeStatus, TradeStatus};
use crate::schema::trade_statuses::dsl::*;

pub type PgPoolConn = PooledConnection<ConnectionManager<PgConnection>>;

pub fn find_by_key(
    conn: &mut PgPoolConn,
    code: &str,
    date: &str,
) -> Result<Option<TradeStatus>, diesel::result::Error> {
    trade_statuses
        .filter(item_cd.eq(code))
        .filter(trade_date.eq(date))
        .first(conn)
        .optional()
}

/// 当日持仓中（BS）的全部状态行，按代码升序
pub fn find_bought(conn: &mut PgPoolConn, date: &str) -> Result<Vec<TradeStatus>, diesel::result::Error> {
    trade_statuses
        .filter(trade_date.eq(date))
        .filter(trade_type.eq("BS"))
        .order(item_cd.asc())
        .load::<TradeStatus>(conn)
}

/// (代码, 日期) 每天至多一行：新建时记录委托号与时刻，更新时覆盖方向/数量/价格/委托号
pub fn upsert(conn: &mut PgPoolConn, new_rec: &NewTradeStatus) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(trade_statuses)
        .values(new_rec)
        .on_conflict((item_cd, trade_date))
        .do_update()
        .set((
            trade_type.eq(&new_rec.trade_type),
            odno.eq(&new_rec.odno),
            qty.eq(new_rec.qty),
            trade_price.eq(new_rec.trade_price),
        ))
        .execute(conn)
}
