use bigdecimal::BigDecimal;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};

use crate::models::{NewBalanceSheet, NewEtcSheet, NewIncomeSheet, NewProfitSheet, NewRatioSheet};

pub type PgPoolConn = PooledConnection<ConnectionManager<PgConnection>>;

pub fn upsert_balance(conn: &mut PgPoolConn, new_rec: &NewBalanceSheet) -> Result<usize, diesel::result::Error> {
    use crate::schema::balance_sheets::dsl::*;
    diesel::insert_into(balance_sheets)
        .values(new_rec)
        .on_conflict((item_cd, sheet_cl, stac_yymm))
        .do_update()
        .set(new_rec)
        .execute(conn)
}

pub fn upsert_income(conn: &mut PgPoolConn, new_rec: &NewIncomeSheet) -> Result<usize, diesel::result::Error> {
    use crate::schema::income_sheets::dsl::*;
    diesel::insert_into(income_sheets)
        .values(new_rec)
        .on_conflict((item_cd, sheet_cl, stac_yymm))
        .do_update()
        .set(new_rec)
        .execute(conn)
}

pub fn upsert_ratio(conn: &mut PgPoolConn, new_rec: &NewRatioSheet) -> Result<usize, diesel::result::Error> {
    use crate::schema::ratio_sheets::dsl::*;
    diesel::insert_into(ratio_sheets)
        .values(new_rec)
        .on_conflict((item_cd, sheet_cl, stac_yymm))
        .do_update()
        .set(new_rec)
        .execute(conn)
}

pub fn upsert_profit(conn: &mut PgPoolConn, new_rec: &NewProfitSheet) -> Result<usize, diesel::result::Error> {
    use crate::schema::profit_sheets::dsl::*;
    diesel::insert_into(profit_sheets)
        .values(new_rec)
        .on_conflict((item_cd, sheet_cl, stac_yymm))
        .do_update()
        .set(new_rec)
        .execute(conn)
}

pub fn upsert_etc(conn: &mut PgPoolConn, new_rec: &NewEtcSheet) -> Result<usize, diesel::result::Error> {
    use crate::schema::etc_sheets::dsl::*;
    diesel::insert_into(etc_sheets)
        .values(new_rec)
        .on_conflict((item_cd, sheet_cl, stac_yymm))
        .do_update()
        .set(new_rec)
        .execute(conn)
}

/// 最近一期损益表的净利润，不区分年报/季报。
/// 排序：结算年月降序，年报/季报升序兜底保证结果稳定。
pub fn latest_net_income(conn: &mut PgPoolConn, code: &str) -> Result<Option<BigDecimal>, diesel::result::Error> {
    use crate::schema::income_sheets::dsl::*;
    income_sheets
        .filter(item_cd.eq(code))
        .select(thtr_ntin)
        .order((stac_yymm.desc(), sheet_cl.asc()))
        .first::<BigDecimal>(conn)
        .optional()
}
