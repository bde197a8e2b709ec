use diesel::prelude::*;

use crate::schema::trade_infos;

/// 个股当日交易策略信息：枢轴/支撑/阻力位与可买入标记
#[derive(Queryable, Debug, Clone)]
pub struct TradeInfo {
    pub item_cd: String,
    pub stck_bsop_date: String,
    pub pivot: Option<i32>,
    pub r1: Option<i32>,
    pub r2: Option<i32>,
    pub r3: Option<i32>,
    pub s1: Option<i32>,
    pub s2: Option<i32>,
    pub s3: Option<i32>,
    pub stck_oprc: Option<i32>,
    pub stck_prdy_clpr: Option<i32>,
    pub stck_prpr: Option<i32>,
    pub cd_type: String,
    pub yn_possibility: String,
    pub rmk: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = trade_infos)]
pub struct NewTradeInfo {
    pub item_cd: String,
    pub stck_bsop_date: String,
    pub pivot: Option<i32>,
    pub r1: Option<i32>,
    pub r2: Option<i32>,
    pub r3: Option<i32>,
    pub s1: Option<i32>,
    pub s2: Option<i32>,
    pub s3: Option<i32>,
    pub stck_oprc: Option<i32>,
    pub stck_prdy_clpr: Option<i32>,
    pub stck_prpr: Option<i32>,
    pub cd_type: String,
    pub yn_possibility: String,
    pub rmk: String,
}

/// 枢轴指标更新 changeset，不触碰可买入标记与备注；None 字段保留原值
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = trade_infos)]
pub struct PivotUpdate {
    pub pivot: Option<i32>,
    pub r1: Option<i32>,
    pub r2: Option<i32>,
    pub r3: Option<i32>,
    pub s1: Option<i32>,
    pub s2: Option<i32>,
    pub s3: Option<i32>,
    pub stck_oprc: Option<i32>,
    pub stck_prdy_clpr: Option<i32>,
    pub cd_type: Option<String>,
}

/// 盘中现价/开盘价刷新 changeset
#[derive(AsChangeset, Debug, Clone, Copy)]
#[diesel(table_name = trade_infos)]
pub struct PriceUpdate {
    pub stck_prpr: Option<i32>,
    pub stck_oprc: Option<i32>,
}

/// 可买入标记/策略/备注更新 changeset
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = trade_infos)]
pub struct PossibilityUpdate {
    pub yn_possibility: String,
    pub cd_type: Option<String>,
    pub rmk: String,
}
