use crate::models::MaUpdate;
use crate::repositories::price_bar;
use crate::repositories::price_bar::PgPoolConn;

/// 单个窗口的算术均值。
///
/// `closes` 最新在前，窗口从 index 沿索引向后（时间上向旧）推进，
/// 越界部分截断（不足 w 根时给出部分均值）。收盘价为 0 视为缺失，
/// 既不进分子也不进分母；窗口内全部缺失时返回 0.0。
pub fn window_mean(closes: &[f64], index: usize, window: usize) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for j in 0..window {
        let idx = index + j;
        if idx >= closes.len() {
            break;
        }
        if closes[idx] != 0.0 {
            sum += closes[idx];
            count += 1;
        }
    }
    if count > 0 {
        sum / count as f64
    } else {
        0.0
    }
}

fn compute(closes: &[f64], index: usize) -> MaUpdate {
    MaUpdate {
        ma5: Some(window_mean(closes, index, 5)),
        ma10: Some(window_mean(closes, index, 10)),
        ma20: Some(window_mean(closes, index, 20)),
        ma30: Some(window_mean(closes, index, 30)),
        ma60: Some(window_mean(closes, index, 60)),
        ma120: Some(window_mean(closes, index, 120)),
        ma200: Some(window_mean(closes, index, 200)),
        ma240: Some(window_mean(closes, index, 240)),
    }
}

/// 重算一只股票全部日线的八条均线并写回。纯函数式重算，天然幂等。
pub fn refresh_for_item(conn: &mut PgPoolConn, code: &str) -> Result<usize, diesel::result::Error> {
    let bars = price_bar::find_all_desc(conn, code)?;
    let closes: Vec<f64> = bars.iter().map(|b| b.stck_clpr as f64).collect();

    let mut updated = 0;
    for (i, bar) in bars.iter().enumerate() {
        let update = compute(&closes, i);
        updated += price_bar::update_ma(conn, code, &bar.stck_bsop_date, &update)?;
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_window_mean() {
        let closes = vec![100.0, 110.0, 120.0, 130.0, 140.0];
        assert_eq!(window_mean(&closes, 0, 5), 120.0);
        assert_eq!(window_mean(&closes, 0, 2), 105.0);
    }

    #[test]
    fn test_partial_window_at_tail() {
        let closes = vec![100.0, 110.0, 120.0];
        // only two bars remain from index 1
        assert_eq!(window_mean(&closes, 1, 5), 115.0);
        // a single remaining bar is its own mean
        assert_eq!(window_mean(&closes, 2, 240), 120.0);
    }

    #[test]
    fn test_zero_close_excluded_from_divisor() {
        let closes = vec![100.0, 0.0, 120.0];
        assert_eq!(window_mean(&closes, 0, 3), 110.0);
    }

    #[test]
    fn test_all_missing_window_is_zero() {
        let closes = vec![0.0, 0.0];
        assert_eq!(window_mean(&closes, 0, 5), 0.0);
        assert_eq!(window_mean(&[], 0, 5), 0.0);
    }

    #[test]
    fn test_every_index_every_window_matches_naive_mean() {
        let closes: Vec<f64> = (1..=300).map(|v| v as f64).collect();
        for i in (0..closes.len()).step_by(17) {
            for w in [5, 10, 20, 30, 60, 120, 200, 240] {
                let slice = &closes[i..closes.len().min(i + w)];
                let expected = slice.iter().sum::<f64>() / slice.len() as f64;
                assert!((window_mean(&closes, i, w) - expected).abs() < 1e-9);
            }
        }
    }
}
