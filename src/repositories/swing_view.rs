use bigdecimal::BigDecimal;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sql_types::{BigInt, Integer, Nullable, Numeric, Text, Double};

pub type PgPoolConn = PooledConnection<ConnectionManager<PgConnection>>;

/// 打分引擎消费的联合视图行：最近一期年报比率 × 股票主档 × 基本面快照 × 最近交易日日线。
/// 每次打分只发一条 SQL，按 (市场, 行业, 代码) 排序保证遍历顺序确定。
#[derive(QueryableByName, Debug, Clone)]
pub struct SwingRow {
    #[diesel(sql_type = Text)]
    pub mrkt_ctg: String,
    #[diesel(sql_type = Text)]
    pub bstp_kor_isnm: String,
    #[diesel(sql_type = Text)]
    pub item_cd: String,
    #[diesel(sql_type = Text)]
    pub itms_nm: String,
    #[diesel(sql_type = Numeric)]
    pub grs: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub bsop_prfi_inrt: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub rsrv_rate: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub lblt_rate: BigDecimal,
    #[diesel(sql_type = Integer)]
    pub stck_clpr: i32,
    #[diesel(sql_type = Numeric)]
    pub stck_dryy_hgpr: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub dryy_hgpr_vrss_prpr_rate: BigDecimal,
    #[diesel(sql_type = Nullable<Double>)]
    pub ma5: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub ma10: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub ma20: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub ma30: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub ma60: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub ma120: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub ma240: Option<f64>,
    #[diesel(sql_type = Numeric)]
    pub frgn_ntby_qty: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub pgtr_ntby_qty: BigDecimal,
    #[diesel(sql_type = BigInt)]
    pub acml_vol: i64,
    #[diesel(sql_type = Numeric)]
    pub frgn_hldn_qty: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub lstn_stcn: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub per: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub pbr: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub stck_dryy_lwpr: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub dryy_lwpr_vrss_prpr_rate: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub eps: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub bps: BigDecimal,
}

const SWING_VIEW_SQL: &str = "\
SELECT t.mrkt_ctg, e.bstp_kor_isnm, rs.item_cd, t.itms_nm, \
       rs.grs, rs.bsop_prfi_inrt, rs.rsrv_rate, rs.lblt_rate, \
       p.stck_clpr, e.stck_dryy_hgpr, e.dryy_hgpr_vrss_prpr_rate, \
       p.ma5, p.ma10, p.ma20, p.ma30, p.ma60, p.ma120, p.ma240, \
       e.frgn_ntby_qty, e.pgtr_ntby_qty, p.acml_vol, e.frgn_hldn_qty, e.lstn_stcn, \
       e.per, e.pbr, e.stck_dryy_lwpr, e.dryy_lwpr_vrss_prpr_rate, e.eps, e.bps \
FROM ratio_sheets rs \
INNER JOIN ( \
    SELECT item_cd, MAX(stac_yymm) AS stac_yymm \
    FROM ratio_sheets \
    WHERE sheet_cl = '0' \
    GROUP BY item_cd \
) last_rs ON rs.item_cd = last_rs.item_cd AND rs.stac_yymm = last_rs.stac_yymm \
INNER JOIN tickers t ON rs.item_cd = t.item_cd \
INNER JOIN equity_snapshots e ON rs.item_cd = e.item_cd \
INNER JOIN ( \
    SELECT * FROM price_bars \
    WHERE stck_bsop_date IN ( \
        SELECT MAX(stck_bsop_date) FROM price_bars WHERE stck_bsop_date <= $1 \
    ) \
) p ON rs.item_cd = p.item_cd \
WHERE rs.sheet_cl = '0' \
  AND t.itms_nm NOT LIKE '%스팩%' \
ORDER BY t.mrkt_ctg, e.bstp_kor_isnm, rs.item_cd";

/// `as_of_date` 取昨日（YYYYMMDD）：打分跑在凌晨，日线最多到前一交易日。
/// SPAC（名称含 '스팩'）整体排除。
pub fn find_filtered_rows(
    conn: &mut PgPoolConn,
    as_of_date: &str,
) -> Result<Vec<SwingRow>, diesel::result::Error> {
    diesel::sql_query(SWING_VIEW_SQL)
        .bind::<Text, _>(as_of_date)
        .load::<SwingRow>(conn)
}
