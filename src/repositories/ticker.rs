use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};

use crate::models::{NewTicker, Ticker};
use crate::schema::tickers::dsl::*;

pub type PgPoolConn = PooledConnection<ConnectionManager<PgConnection>>;

pub fn create(conn: &mut PgPoolConn, new_rec: &NewTicker) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(tickers).values(new_rec).execute(conn)
}

pub fn find_by_code(conn: &mut PgPoolConn, code: &str) -> Result<Option<Ticker>, diesel::result::Error> {
    tickers.filter(item_cd.eq(code)).first(conn).optional()
}

pub fn exists_by_code(conn: &mut PgPoolConn, code: &str) -> Result<bool, diesel::result::Error> {
    use diesel::dsl::count_star;
    let cnt: i64 = tickers.filter(item_cd.eq(code)).select(count_star()).get_result(conn)?;
    Ok(cnt > 0)
}

/// 按市场（KOSPI/KOSDAQ）列出全部股票代码，按代码升序保证遍历顺序稳定
pub fn list_codes_by_market(conn: &mut PgPoolConn, market: &str) -> Result<Vec<String>, diesel::result::Error> {
    tickers
        .filter(mrkt_ctg.eq(market))
        .select(item_cd)
        .order(item_cd.asc())
        .load::<String>(conn)
}

/// 名称/板块随交易所参考数据刷新，其余列建档后不再变更
pub fn refresh_name_sector(
    conn: &mut PgPoolConn,
    code: &str,
    name: &str,
    sector_nm: &str,
) -> Result<usize, diesel::result::Error> {
    diesel::update(tickers.filter(item_cd.eq(code)))
        .set((itms_nm.eq(name), sector.eq(sector_nm)))
        .execute(conn)
}
