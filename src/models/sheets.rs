use bigdecimal::BigDecimal;
use diesel::prelude::*;

use crate::schema::{balance_sheets, etc_sheets, income_sheets, profit_sheets, ratio_sheets};

// 五类财务报表共用 (股票代码, 年报/季报, 结算年月) 复合键，数值列统一 NUMERIC(23,2)

#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = balance_sheets)]
pub struct NewBalanceSheet {
    pub item_cd: String,
    pub sheet_cl: String,
    pub stac_yymm: String,
    pub cras: BigDecimal,
    pub fxas: BigDecimal,
    pub total_aset: BigDecimal,
    pub flow_lblt: BigDecimal,
    pub fix_lblt: BigDecimal,
    pub total_lblt: BigDecimal,
    pub cpfn: BigDecimal,
    pub cfp_surp: BigDecimal,
    pub prfi_surp: BigDecimal,
    pub total_cptl: BigDecimal,
}

#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = income_sheets)]
pub struct NewIncomeSheet {
    pub item_cd: String,
    pub sheet_cl: String,
    pub stac_yymm: String,
    pub sale_account: BigDecimal,
    pub sale_cost: BigDecimal,
    pub sale_totl_prfi: BigDecimal,
    pub depr_cost: BigDecimal,
    pub sell_mang: BigDecimal,
    pub bsop_prti: BigDecimal,
    pub bsop_non_ernn: BigDecimal,
    pub bsop_non_expn: BigDecimal,
    pub op_prfi: BigDecimal,
    pub spec_prfi: BigDecimal,
    pub spec_loss: BigDecimal,
    pub thtr_ntin: BigDecimal,
}

#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = ratio_sheets)]
pub struct NewRatioSheet {
    pub item_cd: String,
    pub sheet_cl: String,
    pub stac_yymm: String,
    pub grs: BigDecimal,
    pub bsop_prfi_inrt: BigDecimal,
    pub ntin_inrt: BigDecimal,
    pub roe_val: BigDecimal,
    pub eps: BigDecimal,
    pub sps: BigDecimal,
    pub bps: BigDecimal,
    pub rsrv_rate: BigDecimal,
    pub lblt_rate: BigDecimal,
}

#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = profit_sheets)]
pub struct NewProfitSheet {
    pub item_cd: String,
    pub sheet_cl: String,
    pub stac_yymm: String,
    pub cptl_ntin_rate: BigDecimal,
    pub self_cptl_ntin_inrt: BigDecimal,
    pub sale_ntin_rate: BigDecimal,
    pub sale_totl_rate: BigDecimal,
}

#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = etc_sheets)]
pub struct NewEtcSheet {
    pub item_cd: String,
    pub sheet_cl: String,
    pub stac_yymm: String,
    pub payout_rate: BigDecimal,
    pub eva: BigDecimal,
    pub ebitda: BigDecimal,
    pub ev_ebitda: BigDecimal,
}
