use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};

use crate::models::{MaUpdate, NewPriceBar, PriceBar};
use crate::schema::price_bars::dsl::*;

pub type PgPoolConn = PooledConnection<ConnectionManager<PgConnection>>;

pub fn upsert(conn: &mut PgPoolConn, new_rec: &NewPriceBar) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(price_bars)
        .values(new_rec)
        .on_conflict((item_cd, stck_bsop_date))
        .do_update()
        .set(new_rec)
        .execute(conn)
}

/// 某只股票的全部日线，最新在前。均线/RSI/OBV 都按这个顺序消费。
pub fn find_all_desc(conn: &mut PgPoolConn, code: &str) -> Result<Vec<PriceBar>, diesel::result::Error> {
    price_bars
        .filter(item_cd.eq(code))
        .order((stck_bsop_date.desc(), item_cd.asc()))
        .load::<PriceBar>(conn)
}

/// 最新一根日线（昨日收盘后即为昨日 bar）
pub fn find_latest(conn: &mut PgPoolConn, code: &str) -> Result<Option<PriceBar>, diesel::result::Error> {
    price_bars
        .filter(item_cd.eq(code))
        .order((stck_bsop_date.desc(), item_cd.asc()))
        .first(conn)
        .optional()
}

pub fn find_by_key(
    conn: &mut PgPoolConn,
    code: &str,
    date: &str,
) -> Result<Option<PriceBar>, diesel::result::Error> {
    price_bars
        .filter(item_cd.eq(code))
        .filter(stck_bsop_date.eq(date))
        .first(conn)
        .optional()
}

pub fn update_ma(
    conn: &mut PgPoolConn,
    code: &str,
    date: &str,
    update: &MaUpdate,
) -> Result<usize, diesel::result::Error> {
    diesel::update(
        price_bars
            .filter(item_cd.eq(code))
            .filter(stck_bsop_date.eq(date)),
    )
    .set(update)
    .execute(conn)
}
