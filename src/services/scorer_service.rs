use bigdecimal::{BigDecimal, ToPrimitive};

use crate::app::AppContext;
use crate::models::{NewScoreCard, PossibilityUpdate};
use crate::repositories::{price_bar, score_card, sheet, swing_view, trade_info};
use crate::repositories::swing_view::SwingRow;
use crate::utils::date_utils;

// 门槛：中途不达标立即淘汰，省掉后续计算（KPI 要额外查全量日线）
const MIN_SHEET_SCORE: i32 = 3;
const MIN_PRICE_SCORE: i32 = 0;
const MIN_TREND_SCORE: i32 = 3;
const MIN_AVLS_SCORE: i32 = 3;
/// 入选总分线
const TOTAL_SCORE_THRESHOLD: i32 = 30;

const SWING_TYPE: &str = "SW";

/// RSI/OBV 的观察期
const KPI_PERIOD: usize = 14;

/// 四道门槛分。任何一道不过都不会产生 ScoreCard。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateScores {
    pub sheet: i32,
    pub price: i32,
    pub trend: i32,
    pub avls: i32,
}

/// 依次过四道门槛，不达标立即返回 None（跳过该股票）
pub fn gate_scores(row: &SwingRow, latest_net_income: f64) -> Option<GateScores> {
    let sheet = sheet_score(row, latest_net_income);
    if sheet < MIN_SHEET_SCORE {
        return None;
    }

    let price = price_score(dec(&row.dryy_hgpr_vrss_prpr_rate), dec(&row.dryy_lwpr_vrss_prpr_rate));
    if price < MIN_PRICE_SCORE {
        return None;
    }

    let trend = trend_score(
        row.stck_clpr as f64,
        row.ma5.unwrap_or(0.0),
        row.ma20.unwrap_or(0.0),
        row.ma60.unwrap_or(0.0),
    );
    if trend < MIN_TREND_SCORE {
        return None;
    }

    let avls = avls_score(dec(&row.lstn_stcn), row.stck_clpr as f64);
    if avls < MIN_AVLS_SCORE {
        return None;
    }

    Some(GateScores { sheet, price, trend, avls })
}

#[derive(Debug, Default)]
pub struct ScoringResult {
    pub total_count: usize,
    pub selected_count: usize,
    pub failed_count: usize,
}

/// 全市场打分入口。联合视图只查一次，按 (市场, 行业, 代码) 顺序逐只处理；
/// 单只失败只记日志不中断，当日也不会给它写 ScoreCard。
pub fn run_swing_scoring(ctx: &AppContext) -> anyhow::Result<ScoringResult> {
    let date = date_utils::today_string();
    let as_of = date_utils::yesterday_string();

    let mut conn = ctx.db_pool.get()?;
    let rows = swing_view::find_filtered_rows(&mut conn, &as_of)?;
    tracing::info!("打分对象 {} 只 (基准日 {})", rows.len(), as_of);

    let mut result = ScoringResult {
        total_count: rows.len(),
        ..Default::default()
    };

    for row in &rows {
        match score_one(ctx, row, &date) {
            Ok(true) => result.selected_count += 1,
            Ok(false) => {}
            Err(e) => {
                result.failed_count += 1;
                tracing::error!("打分失败: {} - {}", row.item_cd, e);
            }
        }
    }

    tracing::info!(
        "打分完成, 总计: {}, 入选: {}, 失败: {}",
        result.total_count,
        result.selected_count,
        result.failed_count
    );
    Ok(result)
}

fn score_one(ctx: &AppContext, row: &SwingRow, date: &str) -> anyhow::Result<bool> {
    let mut conn = ctx.db_pool.get()?;

    let net_income = sheet::latest_net_income(&mut conn, &row.item_cd)?
        .as_ref()
        .map(dec)
        .unwrap_or(0.0);

    let Some(gates) = gate_scores(row, net_income) else {
        return Ok(false);
    };

    let buy_score = buy_score(
        dec(&row.frgn_ntby_qty),
        dec(&row.pgtr_ntby_qty),
        row.acml_vol as f64,
        dec(&row.frgn_hldn_qty),
        dec(&row.lstn_stcn),
    );
    let per_score = per_score(dec(&row.per));
    let pbr_score = pbr_score(dec(&row.pbr));

    // 技术指标需要整段日线，放在所有门槛之后再查库
    let bars = price_bar::find_all_desc(&mut conn, &row.item_cd)?;
    let series: Vec<(f64, f64)> = bars
        .iter()
        .map(|b| (b.stck_clpr as f64, b.acml_vol as f64))
        .collect();
    let kpi_score = kpi_score(&series);

    let total =
        gates.sheet + gates.trend + gates.price + buy_score + kpi_score + gates.avls + per_score + pbr_score;

    if total <= TOTAL_SCORE_THRESHOLD {
        return Ok(false);
    }

    tracing::info!(
        "发现入选股: {} ({}), 总分: {}",
        row.itms_nm,
        row.item_cd,
        total
    );

    score_card::upsert(
        &mut conn,
        &NewScoreCard {
            item_cd: row.item_cd.clone(),
            stck_bsop_date: date.to_string(),
            sheet_score: gates.sheet,
            trend_score: gates.trend,
            price_score: gates.price,
            kpi_score,
            buy_score,
            avls_score: gates.avls,
            per_score,
            pbr_score,
            total_score: total,
        },
    )?;
    trade_info::upsert_possibility(
        &mut conn,
        &row.item_cd,
        date,
        &PossibilityUpdate {
            yn_possibility: "Y".to_string(),
            cd_type: Some(SWING_TYPE.to_string()),
            rmk: "swing target".to_string(),
        },
    )?;
    Ok(true)
}

fn dec(v: &BigDecimal) -> f64 {
    v.to_f64().unwrap_or(0.0)
}

/// 财务分：成长性、盈利率、留存、负债、净利润各 1 分
pub fn sheet_score(row: &SwingRow, latest_net_income: f64) -> i32 {
    let mut score = 0;
    if dec(&row.grs) > 10.0 {
        score += 1;
    }
    if dec(&row.bsop_prfi_inrt) > 10.0 {
        score += 1;
    }
    if dec(&row.rsrv_rate) > 500.0 {
        score += 1;
    }
    if dec(&row.lblt_rate) > 50.0 {
        score += 1;
    }
    if latest_net_income > 0.0 {
        score += 1;
    }
    score
}

/// 价格位置分：距年内高点回撤越深加分越多，距年内低点涨幅过大则扣分，下限 0
pub fn price_score(rate_vs_year_high: f64, rate_vs_year_low: f64) -> i32 {
    let score = high_price_award(rate_vs_year_high) - low_price_penalty(rate_vs_year_low);
    score.max(0)
}

fn high_price_award(rate: f64) -> i32 {
    if rate < -30.0 {
        5
    } else if rate < -20.0 {
        4
    } else if rate < -10.0 {
        3
    } else if rate < -5.0 {
        2
    } else if rate < 0.0 {
        1
    } else {
        0
    }
}

fn low_price_penalty(rate: f64) -> i32 {
    if rate > 30.0 {
        3
    } else if rate > 20.0 {
        2
    } else if rate > 10.0 {
        1
    } else {
        0
    }
}

/// 均线趋势分。任一均线缺失（0）直接 0 分。
pub fn trend_score(close: f64, ma5: f64, ma20: f64, ma60: f64) -> i32 {
    if ma5 == 0.0 || ma20 == 0.0 || ma60 == 0.0 {
        return 0;
    }
    let mut score = 0;
    if ma60 > ma20 {
        score += 2;
    }
    if close >= ma20 {
        score += 2;
    }
    if close >= ma5 {
        score += 1;
    }
    score
}

/// 市值规模分。阈值取 억 (1e8 KRW) 的 100/500/1000/5000 倍。
pub fn avls_score(listed_shares: f64, close: f64) -> i32 {
    const EOK: f64 = 100_000_000.0;
    let cap = listed_shares * close;

    if cap < 100.0 * EOK {
        1
    } else if cap < 500.0 * EOK {
        2
    } else if cap < 1000.0 * EOK {
        3
    } else if cap < 5000.0 * EOK {
        4
    } else {
        5
    }
}

/// 资金流入分：外资/程序化净买入占成交量比例与外资持仓率
pub fn buy_score(
    frgn_ntby_qty: f64,
    pgtr_ntby_qty: f64,
    volume: f64,
    frgn_hldn_qty: f64,
    listed_shares: f64,
) -> i32 {
    let vol_rate = rate(frgn_ntby_qty, volume).max(rate(pgtr_ntby_qty, volume));
    let holding_rate = rate(frgn_hldn_qty, listed_shares);

    if vol_rate > 10.0 && holding_rate > 10.0 {
        5
    } else if vol_rate > 10.0 || holding_rate > 10.0 {
        4
    } else if vol_rate > 5.0 && holding_rate > 5.0 {
        3
    } else if vol_rate > 5.0 || holding_rate > 5.0 {
        2
    } else {
        1
    }
}

pub fn per_score(per: f64) -> i32 {
    if per <= 0.0 {
        1
    } else if per < 5.0 {
        5
    } else if per < 10.0 {
        4
    } else if per < 15.0 {
        3
    } else if per < 20.0 {
        2
    } else {
        1
    }
}

pub fn pbr_score(pbr: f64) -> i32 {
    if pbr <= 0.0 {
        1
    } else if pbr < 1.0 {
        5
    } else if pbr < 2.0 {
        4
    } else if pbr < 3.0 {
        3
    } else if pbr < 4.0 {
        2
    } else {
        1
    }
}

/// KPI = RSI 分 + OBV 分，两者同时给出信号再加 1
pub fn kpi_score(series: &[(f64, f64)]) -> i32 {
    let closes: Vec<f64> = series.iter().map(|(c, _)| *c).collect();
    let rsi = rsi_score(&closes, KPI_PERIOD);
    let obv = obv_score(series, KPI_PERIOD);
    rsi + obv + if rsi != 0 && obv != 0 { 1 } else { 0 }
}

/// Wilder 平滑 RSI。
///
/// 序列最新在前，涨跌幅按索引向后（向更旧的 bar）推进，与日线读取约定一致。
/// RSI > 70 过热 → -2；< 30 超卖 → +2；否则 0。不足 period 根返回 0。
pub fn rsi_score(closes: &[f64], period: usize) -> i32 {
    // 平滑循环至少要有一根 bar 可走，正好 period 根时没有信号
    if closes.len() <= period {
        return 0;
    }

    let n = closes.len();
    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];
    for i in 1..n {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            gains[i] = change;
        } else {
            losses[i] = -change;
        }
    }

    let mut avg_gain = gains[1..=period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[1..=period].iter().sum::<f64>() / period as f64;

    let mut rsi = 0.0;
    for i in period..n {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
        rsi = if avg_loss == 0.0 {
            100.0
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        };
    }

    if rsi > 70.0 {
        -2
    } else if rsi < 30.0 {
        2
    } else {
        0
    }
}

/// 能量潮（OBV）趋势。
///
/// 按索引累积（收涨加量、收跌减量），末值对比 period 根之前的值：
/// 上行 +2，下行 -2，持平 0。不足 period 根返回 0。
pub fn obv_score(series: &[(f64, f64)], period: usize) -> i32 {
    if series.len() < 2 {
        return 0;
    }

    let mut obv_values = Vec::with_capacity(series.len());
    let mut obv = 0.0;
    obv_values.push(obv);
    for i in 1..series.len() {
        let (cur_close, cur_vol) = series[i];
        let (prev_close, _) = series[i - 1];
        if cur_close > prev_close {
            obv += cur_vol;
        } else if cur_close < prev_close {
            obv -= cur_vol;
        }
        obv_values.push(obv);
    }

    if obv_values.len() < period {
        return 0;
    }

    let start = obv_values[obv_values.len() - period];
    let end = *obv_values.last().unwrap();
    if end > start {
        2
    } else if end < start {
        -2
    } else {
        0
    }
}

fn rate(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        0.0
    } else {
        a / b * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn sample_row() -> SwingRow {
        SwingRow {
            mrkt_ctg: "KOSPI".to_string(),
            bstp_kor_isnm: "전기전자".to_string(),
            item_cd: "005930".to_string(),
            itms_nm: "샘플전자".to_string(),
            grs: d("12"),
            bsop_prfi_inrt: d("15"),
            rsrv_rate: d("600"),
            lblt_rate: d("40"),
            stck_clpr: 9000,
            stck_dryy_hgpr: d("12000"),
            dryy_hgpr_vrss_prpr_rate: d("-25"),
            ma5: Some(8800.0),
            ma10: Some(8750.0),
            ma20: Some(8700.0),
            ma30: Some(8720.0),
            ma60: Some(8750.0),
            ma120: Some(8600.0),
            ma240: Some(8400.0),
            frgn_ntby_qty: d("1200000"),
            pgtr_ntby_qty: d("500000"),
            acml_vol: 10_000_000,
            frgn_hldn_qty: d("7000000"),
            lstn_stcn: d("50000000"),
            per: d("7"),
            pbr: d("0.8"),
            stck_dryy_lwpr: d("7000"),
            dryy_lwpr_vrss_prpr_rate: d("8"),
            eps: d("1200"),
            bps: d("11000"),
        }
    }

    #[test]
    fn test_sheet_score_happy_path() {
        // 营收/营业利润增速超 10、留存率超 500、净利润为正，负债率 40 不计分
        assert_eq!(sheet_score(&sample_row(), 1.0), 4);
    }

    #[test]
    fn test_sheet_score_gate_fail() {
        let mut row = sample_row();
        row.grs = d("5");
        row.bsop_prfi_inrt = d("5");
        row.rsrv_rate = d("100");
        row.lblt_rate = d("20");
        assert_eq!(sheet_score(&row, 0.0), 0);
    }

    #[test]
    fn test_sheet_score_monotone_in_revenue_growth() {
        let mut row = sample_row();
        row.grs = d("9");
        let below = sheet_score(&row, 1.0);
        row.grs = d("11");
        let above = sheet_score(&row, 1.0);
        assert!(above >= below);
        assert_eq!(above - below, 1);
    }

    #[test]
    fn test_price_score_bands() {
        assert_eq!(price_score(-35.0, 0.0), 5);
        assert_eq!(price_score(-25.0, 8.0), 4);
        assert_eq!(price_score(-15.0, 0.0), 3);
        assert_eq!(price_score(-7.0, 0.0), 2);
        assert_eq!(price_score(-2.0, 0.0), 1);
        assert_eq!(price_score(3.0, 0.0), 0);
        // penalty can never push below zero
        assert_eq!(price_score(-2.0, 35.0), 0);
        assert_eq!(price_score(-35.0, 25.0), 3);
    }

    #[test]
    fn test_trend_score() {
        // ma60 > ma20, close above both ma20 and ma5
        assert_eq!(trend_score(9000.0, 8800.0, 8700.0, 8750.0), 5);
        // missing MA disables the whole score
        assert_eq!(trend_score(9000.0, 0.0, 8700.0, 8750.0), 0);
        // close below everything, ma60 under ma20
        assert_eq!(trend_score(8000.0, 8800.0, 8700.0, 8500.0), 0);
    }

    #[test]
    fn test_avls_score_bands() {
        const EOK: f64 = 100_000_000.0;
        assert_eq!(avls_score(1.0, 50.0 * EOK), 1);
        assert_eq!(avls_score(1.0, 300.0 * EOK), 2);
        assert_eq!(avls_score(1.0, 700.0 * EOK), 3);
        assert_eq!(avls_score(1.0, 4500.0 * EOK), 4);
        assert_eq!(avls_score(1.0, 6000.0 * EOK), 5);
        // 50M shares * 9000 KRW = 4500억 → band 4
        assert_eq!(avls_score(50_000_000.0, 9000.0), 4);
    }

    #[test]
    fn test_buy_score_bands() {
        // vol 12% & holding 14% → both above 10
        assert_eq!(buy_score(1_200_000.0, 500_000.0, 10_000_000.0, 7_000_000.0, 50_000_000.0), 5);
        // only vol above 10
        assert_eq!(buy_score(1_200_000.0, 0.0, 10_000_000.0, 1_000_000.0, 50_000_000.0), 4);
        // both above 5
        assert_eq!(buy_score(600_000.0, 0.0, 10_000_000.0, 3_500_000.0, 50_000_000.0), 3);
        // one above 5
        assert_eq!(buy_score(600_000.0, 0.0, 10_000_000.0, 1_000_000.0, 50_000_000.0), 2);
        assert_eq!(buy_score(100_000.0, 0.0, 10_000_000.0, 1_000_000.0, 50_000_000.0), 1);
        // zero volume never divides
        assert_eq!(buy_score(1_200_000.0, 0.0, 0.0, 1_000_000.0, 50_000_000.0), 1);
    }

    #[test]
    fn test_per_pbr_bands() {
        assert_eq!(per_score(-1.0), 1);
        assert_eq!(per_score(3.0), 5);
        assert_eq!(per_score(7.0), 4);
        assert_eq!(per_score(12.0), 3);
        assert_eq!(per_score(18.0), 2);
        assert_eq!(per_score(25.0), 1);

        assert_eq!(pbr_score(0.0), 1);
        assert_eq!(pbr_score(0.8), 5);
        assert_eq!(pbr_score(1.5), 4);
        assert_eq!(pbr_score(2.5), 3);
        assert_eq!(pbr_score(3.5), 2);
        assert_eq!(pbr_score(4.5), 1);
    }

    #[test]
    fn test_rsi_needs_enough_bars() {
        let closes = vec![100.0; 10];
        assert_eq!(rsi_score(&closes, 14), 0);
        // exactly `period` bars leaves no room for the smoothing walk
        assert_eq!(rsi_score(&vec![100.0; 14], 14), 0);
    }

    #[test]
    fn test_rsi_loss_dominated_series_signals_buy() {
        // index-forward changes are all losses → RSI ≈ 0 → +2
        let closes: Vec<f64> = (0..30).map(|i| 10000.0 - 100.0 * i as f64).collect();
        assert_eq!(rsi_score(&closes, 14), 2);
    }

    #[test]
    fn test_rsi_gain_dominated_series_signals_sell() {
        let closes: Vec<f64> = (0..30).map(|i| 10000.0 + 100.0 * i as f64).collect();
        assert_eq!(rsi_score(&closes, 14), -2);
    }

    #[test]
    fn test_obv_trends() {
        let rising: Vec<(f64, f64)> = (0..30).map(|i| (100.0 + i as f64, 1000.0)).collect();
        assert_eq!(obv_score(&rising, 14), 2);
        let falling: Vec<(f64, f64)> = (0..30).map(|i| (100.0 - i as f64, 1000.0)).collect();
        assert_eq!(obv_score(&falling, 14), -2);
        let flat: Vec<(f64, f64)> = (0..30).map(|_| (100.0, 1000.0)).collect();
        assert_eq!(obv_score(&flat, 14), 0);
        assert_eq!(obv_score(&rising[..1], 14), 0);
    }

    #[test]
    fn test_gates_pass_for_sound_row() {
        let gates = gate_scores(&sample_row(), 1.0).unwrap();
        assert_eq!(gates.sheet, 4);
        assert_eq!(gates.price, 4);
        assert_eq!(gates.trend, 5);
        assert_eq!(gates.avls, 4);
    }

    #[test]
    fn test_sheet_gate_rejects_weak_financials() {
        // every sheet criterion fails → score 0 < 3, no further scoring
        let mut row = sample_row();
        row.grs = d("5");
        row.bsop_prfi_inrt = d("5");
        row.rsrv_rate = d("100");
        row.lblt_rate = d("20");
        assert!(gate_scores(&row, 0.0).is_none());
    }

    #[test]
    fn test_trend_gate_rejects_broken_ma() {
        let mut row = sample_row();
        row.ma20 = Some(0.0);
        assert!(gate_scores(&row, 1.0).is_none());
    }

    #[test]
    fn test_total_score_crosses_threshold() {
        let row = sample_row();
        let gates = gate_scores(&row, 1.0).unwrap();
        let buy = buy_score(
            dec(&row.frgn_ntby_qty),
            dec(&row.pgtr_ntby_qty),
            row.acml_vol as f64,
            dec(&row.frgn_hldn_qty),
            dec(&row.lstn_stcn),
        );
        let per = per_score(dec(&row.per));
        let pbr = pbr_score(dec(&row.pbr));

        // oversold + accumulating series → kpi 5
        let mut closes = vec![10000.0; 16];
        let mut last = 10000.0;
        for i in 0..14 {
            last += if i % 4 == 3 { -500.0 } else { 1.0 };
            closes.push(last);
        }
        let series: Vec<(f64, f64)> = closes.iter().map(|c| (*c, 1000.0)).collect();
        let kpi = kpi_score(&series);

        let total = gates.sheet + gates.trend + gates.price + buy + kpi + gates.avls + per + pbr;
        assert_eq!(total, 4 + 5 + 4 + 5 + 5 + 4 + 4 + 5);
        assert!(total > TOTAL_SCORE_THRESHOLD);
    }

    #[test]
    fn test_kpi_bonus_when_both_signal() {
        // last 14 steps: ten +1 ticks, four -500 drops → avg loss dwarfs avg gain (RSI +2)
        // while the step count is net positive (OBV +2)
        let mut closes = vec![10000.0; 16];
        let mut last = 10000.0;
        for i in 0..14 {
            last += if i % 4 == 3 { -500.0 } else { 1.0 };
            closes.push(last);
        }
        let series: Vec<(f64, f64)> = closes.iter().map(|c| (*c, 1000.0)).collect();
        let closes_only: Vec<f64> = closes.clone();
        assert_eq!(rsi_score(&closes_only, 14), 2);
        assert_eq!(obv_score(&series, 14), 2);
        assert_eq!(kpi_score(&series), 5);
    }
}
