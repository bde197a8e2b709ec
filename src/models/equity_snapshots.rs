use bigdecimal::BigDecimal;
use diesel::prelude::*;

use crate::schema::equity_snapshots;

/// 个股基本面快照，每日采集时整行覆盖。列名保持 KIS 返回字段原样。
#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = equity_snapshots)]
pub struct NewEquitySnapshot {
    pub item_cd: String,
    pub bstp_kor_isnm: String,
    pub iscd_stat_cls_code: String,
    pub stck_sdpr: BigDecimal,
    pub wghn_avrg_stck_prc: BigDecimal,
    pub stck_fcam: BigDecimal,
    pub stck_mxpr: BigDecimal,
    pub stck_llam: BigDecimal,
    pub lstn_stcn: BigDecimal,
    pub hts_avls: BigDecimal,
    pub vol_tnrt: BigDecimal,
    pub frgn_hldn_qty: BigDecimal,
    pub frgn_ntby_qty: BigDecimal,
    pub pgtr_ntby_qty: BigDecimal,
    pub w52_hgpr: BigDecimal,
    pub w52_hgpr_date: String,
    pub w52_hgpr_vrss_prpr_ctrt: BigDecimal,
    pub w52_lwpr: BigDecimal,
    pub w52_lwpr_date: String,
    pub w52_lwpr_vrss_prpr_ctrt: BigDecimal,
    pub stck_dryy_hgpr: BigDecimal,
    pub dryy_hgpr_date: String,
    pub dryy_hgpr_vrss_prpr_rate: BigDecimal,
    pub stck_dryy_lwpr: BigDecimal,
    pub dryy_lwpr_date: String,
    pub dryy_lwpr_vrss_prpr_rate: BigDecimal,
    pub d250_hgpr: BigDecimal,
    pub d250_hgpr_date: String,
    pub d250_hgpr_vrss_prpr_rate: BigDecimal,
    pub d250_lwpr: BigDecimal,
    pub d250_lwpr_date: String,
    pub d250_lwpr_vrss_prpr_rate: BigDecimal,
    pub per: BigDecimal,
    pub eps: BigDecimal,
    pub pbr: BigDecimal,
    pub bps: BigDecimal,
}
