use crate::models::PivotUpdate;
use crate::repositories::price_bar;
use crate::repositories::trade_info;
use crate::repositories::trade_info::PgPoolConn;

/// 经典日内枢轴位。全部整数运算，向零截断。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PivotLevels {
    pub pivot: i32,
    pub r1: i32,
    pub r2: i32,
    pub r3: i32,
    pub s1: i32,
    pub s2: i32,
    pub s3: i32,
}

/// P  = (昨高 + 昨低 + 昨收) / 3
/// R1 = 2P - 昨低, S1 = 2P - 昨高
/// 开盘后（今开 > 0）再用当日振幅推出二、三档：
/// R2 = P + range, R3 = R1 + range, S2 = P - range, S3 = S1 - range
pub fn compute_pivots(
    prdy_hgpr: i32,
    prdy_lwpr: i32,
    prdy_clpr: i32,
    stck_oprc: i32,
    stck_hgpr: i32,
    stck_lwpr: i32,
) -> PivotLevels {
    let pivot = (prdy_hgpr + prdy_lwpr + prdy_clpr) / 3;
    let r1 = pivot * 2 - prdy_lwpr;
    let s1 = pivot * 2 - prdy_hgpr;

    let range = stck_hgpr - stck_lwpr;
    let (r2, r3, s2, s3) = if stck_oprc > 0 {
        (pivot + range, r1 + range, pivot - range, s1 - range)
    } else {
        (0, 0, 0, 0)
    };

    PivotLevels { pivot, r1, r2, r3, s1, s2, s3 }
}

/// 按昨日日线重算枢轴并 upsert 到 trade_infos。
/// 可买入标记与备注保持不动；开盘前（今开 = 0）不触碰二、三档。
pub fn refresh_pivots(
    conn: &mut PgPoolConn,
    code: &str,
    date: &str,
    stck_oprc: i32,
    stck_hgpr: i32,
    stck_lwpr: i32,
    cd_type: &str,
) -> Result<(), diesel::result::Error> {
    let Some(prev) = price_bar::find_latest(conn, code)? else {
        // 没有历史日线就算不出枢轴
        return Ok(());
    };

    let levels = compute_pivots(
        prev.stck_hgpr,
        prev.stck_lwpr,
        prev.stck_clpr,
        stck_oprc,
        stck_hgpr,
        stck_lwpr,
    );

    let opened = stck_oprc > 0;
    let update = PivotUpdate {
        pivot: Some(levels.pivot),
        r1: Some(levels.r1),
        r2: opened.then_some(levels.r2),
        r3: opened.then_some(levels.r3),
        s1: Some(levels.s1),
        s2: opened.then_some(levels.s2),
        s3: opened.then_some(levels.s3),
        stck_oprc: opened.then_some(stck_oprc),
        stck_prdy_clpr: Some(prev.stck_clpr),
        cd_type: Some(cd_type.to_string()),
    };
    trade_info::upsert_pivot(conn, code, date, &update)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pivot_arithmetic() {
        // 昨日 H=10500, L=9900, C=10200 → P = 30600/3 = 10200
        let levels = compute_pivots(10500, 9900, 10200, 10100, 10400, 10000);
        assert_eq!(levels.pivot, 10200);
        assert_eq!(levels.r1, 2 * 10200 - 9900);
        assert_eq!(levels.s1, 2 * 10200 - 10500);
        // range = 400
        assert_eq!(levels.r2, 10200 + 400);
        assert_eq!(levels.r3, levels.r1 + 400);
        assert_eq!(levels.s2, 10200 - 400);
        assert_eq!(levels.s3, levels.s1 - 400);
    }

    #[test]
    fn test_integer_truncation() {
        // 10000+10001+10002 = 30003 → 10001 exactly; 10000+10001+10003 = 30004 → trunc 10001
        assert_eq!(compute_pivots(10000, 10001, 10002, 0, 0, 0).pivot, 10001);
        assert_eq!(compute_pivots(10000, 10001, 10003, 0, 0, 0).pivot, 10001);
    }

    #[test]
    fn test_pre_open_leaves_second_levels_unset() {
        let levels = compute_pivots(10500, 9900, 10200, 0, 0, 0);
        assert_eq!(levels.r2, 0);
        assert_eq!(levels.r3, 0);
        assert_eq!(levels.s2, 0);
        assert_eq!(levels.s3, 0);
        // first levels are always derivable from yesterday's bar
        assert_ne!(levels.r1, 0);
        assert_ne!(levels.s1, 0);
    }
}
