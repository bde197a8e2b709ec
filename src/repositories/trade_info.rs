use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};

use crate::models::{NewTradeInfo, PivotUpdate, PossibilityUpdate, PriceUpdate, TradeInfo};
use crate::schema::trade_infos::dsl::*;

pub type PgPoolConn = PooledConnection<ConnectionManager<PgConnection>>;

pub fn find_by_key(
    conn: &mut PgPoolConn,
    code: &str,
    date: &str,
) -> Result<Option<TradeInfo>, diesel::result::Error> {
    trade_infos
        .filter(item_cd.eq(code))
        .filter(stck_bsop_date.eq(date))
        .first(conn)
        .optional()
}

/// 当日 SW 策略且未被禁买（yn_possibility != 'N'）的候选，按代码升序
pub fn find_buy_candidates(conn: &mut PgPoolConn, date: &str) -> Result<Vec<TradeInfo>, diesel::result::Error> {
    trade_infos
        .filter(stck_bsop_date.eq(date))
        .filter(cd_type.eq("SW"))
        .filter(yn_possibility.ne("N"))
        .order(item_cd.asc())
        .load::<TradeInfo>(conn)
}

pub fn insert(conn: &mut PgPoolConn, new_rec: &NewTradeInfo) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(trade_infos).values(new_rec).execute(conn)
}

/// 枢轴指标 upsert：行不存在则新建（可买入标记留空），存在则只覆盖指标列
pub fn upsert_pivot(
    conn: &mut PgPoolConn,
    code: &str,
    date: &str,
    update: &PivotUpdate,
) -> Result<usize, diesel::result::Error> {
    let existing = find_by_key(conn, code, date)?;
    match existing {
        Some(_) => diesel::update(
            trade_infos
                .filter(item_cd.eq(code))
                .filter(stck_bsop_date.eq(date)),
        )
        .set(update)
        .execute(conn),
        None => {
            let new_rec = NewTradeInfo {
                item_cd: code.to_string(),
                stck_bsop_date: date.to_string(),
                pivot: update.pivot,
                r1: update.r1,
                r2: update.r2,
                r3: update.r3,
                s1: update.s1,
                s2: update.s2,
                s3: update.s3,
                stck_oprc: update.stck_oprc,
                stck_prdy_clpr: update.stck_prdy_clpr,
                stck_prpr: None,
                cd_type: update.cd_type.clone().unwrap_or_default(),
                yn_possibility: String::new(),
                rmk: String::new(),
            };
            insert(conn, &new_rec)
        }
    }
}

/// 盘中现价/开盘价刷新，只对已存在的行生效
pub fn update_price(
    conn: &mut PgPoolConn,
    code: &str,
    date: &str,
    update: &PriceUpdate,
) -> Result<usize, diesel::result::Error> {
    diesel::update(
        trade_infos
            .filter(item_cd.eq(code))
            .filter(stck_bsop_date.eq(date)),
    )
    .set(update)
    .execute(conn)
}

/// 可买入标记/备注 upsert：行不存在则新建并写入策略类型
pub fn upsert_possibility(
    conn: &mut PgPoolConn,
    code: &str,
    date: &str,
    update: &PossibilityUpdate,
) -> Result<usize, diesel::result::Error> {
    let existing = find_by_key(conn, code, date)?;
    match existing {
        Some(_) => diesel::update(
            trade_infos
                .filter(item_cd.eq(code))
                .filter(stck_bsop_date.eq(date)),
        )
        .set(update)
        .execute(conn),
        None => {
            let new_rec = NewTradeInfo {
                item_cd: code.to_string(),
                stck_bsop_date: date.to_string(),
                pivot: None,
                r1: None,
                r2: None,
                r3: None,
                s1: None,
                s2: None,
                s3: None,
                stck_oprc: None,
                stck_prdy_clpr: None,
                stck_prpr: None,
                cd_type: update.cd_type.clone().unwrap_or_default(),
                yn_possibility: update.yn_possibility.clone(),
                rmk: update.rmk.clone(),
            };
            insert(conn, &new_rec)
        }
    }
}
