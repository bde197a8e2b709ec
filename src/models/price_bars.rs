use bigdecimal::BigDecimal;
use diesel::prelude::*;

use crate::schema::price_bars;

#[derive(Queryable, Debug, Clone)]
pub struct PriceBar {
    pub item_cd: String,
    pub stck_bsop_date: String,
    pub stck_clpr: i32,
    pub stck_oprc: i32,
    pub stck_hgpr: i32,
    pub stck_lwpr: i32,
    pub acml_vol: i64,
    pub acml_tr_pbmn: BigDecimal,
    pub prdy_vrss: i32,
    pub prdy_vrss_sign: i32,
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub ma20: Option<f64>,
    pub ma30: Option<f64>,
    pub ma60: Option<f64>,
    pub ma120: Option<f64>,
    pub ma200: Option<f64>,
    pub ma240: Option<f64>,
}

#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = price_bars)]
pub struct NewPriceBar {
    pub item_cd: String,
    pub stck_bsop_date: String,
    pub stck_clpr: i32,
    pub stck_oprc: i32,
    pub stck_hgpr: i32,
    pub stck_lwpr: i32,
    pub acml_vol: i64,
    pub acml_tr_pbmn: BigDecimal,
    pub prdy_vrss: i32,
    pub prdy_vrss_sign: i32,
}

/// 只更新均线列的 changeset
#[derive(AsChangeset, Debug, Clone, Copy)]
#[diesel(table_name = price_bars)]
pub struct MaUpdate {
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub ma20: Option<f64>,
    pub ma30: Option<f64>,
    pub ma60: Option<f64>,
    pub ma120: Option<f64>,
    pub ma200: Option<f64>,
    pub ma240: Option<f64>,
}
