use crate::app::AppContext;
use crate::kis::api::OrderSide;
use crate::models::{PriceUpdate, TradeStatus};
use crate::repositories::{ticker, trade_info, trade_status};
use crate::services::worker_service;
use crate::utils::date_utils;

/// 盘中卖出 tick：对每只持仓算收益率，按移动止盈/止损规则决定是否清仓。
pub async fn exec_sell_task(ctx: &AppContext) -> anyhow::Result<()> {
    let today = date_utils::today_string();
    let holdings = {
        let mut conn = ctx.db_pool.get()?;
        trade_status::find_bought(&mut conn, &today)?
    };
    if holdings.is_empty() {
        tracing::debug!("今日没有持仓");
        return Ok(());
    }

    for status in &holdings {
        if let Err(e) = process_sell_item(ctx, status, &today).await {
            tracing::error!("卖出处理失败: {} - {}", status.item_cd, e);
        }
    }
    Ok(())
}

async fn process_sell_item(ctx: &AppContext, status: &TradeStatus, today: &str) -> anyhow::Result<()> {
    let code = &status.item_cd;
    let bought_price = status.trade_price;
    let bought_qty = status.qty;

    let Some(_guard) = ctx.ticker_locks.try_acquire(code) else {
        tracing::debug!("锁竞争, 本轮跳过: {}", code);
        return Ok(());
    };

    // 股票名只用于日志/通知
    let item_name = {
        let mut conn = ctx.db_pool.get()?;
        ticker::find_by_code(&mut conn, code)?
            .map(|t| t.itms_nm)
            .unwrap_or_else(|| code.clone())
    };

    let price = worker_service::current_price_info(&ctx.kis, code).await?;
    let current = price.stck_prpr;
    if current == 0 {
        return Ok(());
    }

    let profit = calculate_profit(bought_price as f64, current as f64);
    {
        let mut conn = ctx.db_pool.get()?;
        trade_info::update_price(
            &mut conn,
            code,
            today,
            &PriceUpdate {
                stck_prpr: Some(current),
                stck_oprc: Some(price.stck_oprc),
            },
        )?;
    }

    tracing::info!(
        "卖出检查: {} ({}), 买价={} (数量={}), 现价={}, 收益率={}%",
        item_name,
        code,
        bought_price,
        bought_qty,
        current,
        profit
    );

    if !ctx.config.trading.test_force_sell {
        // 建仓未完成（持仓金额不到限额 × 比例）时继续持有
        if (bought_qty as i64) * (bought_price as i64)
            < (ctx.config.trading.limit_price as f64 * ctx.config.trading.sell_hold_rate) as i64
        {
            return Ok(());
        }

        if !should_sell(ctx, code, &item_name, profit, current, today)? {
            return Ok(());
        }
    } else {
        tracing::warn!("[TEST MODE] 强制卖出: {} ({}) 跳过条件校验", item_name, code);
    }

    tracing::info!("执行卖出: {} ({}), 收益率: {}%", item_name, code, profit);
    worker_service::submit_order(ctx, code, bought_qty, current, OrderSide::Sell).await?;
    Ok(())
}

fn should_sell(
    ctx: &AppContext,
    code: &str,
    item_name: &str,
    profit: f64,
    current: i32,
    today: &str,
) -> anyhow::Result<bool> {
    let info = {
        let mut conn = ctx.db_pool.get()?;
        trade_info::find_by_key(&mut conn, code, today)?
    };
    let stop_line = info
        .map(|i| stop_line_price(i.s1, i.s2, i.s3))
        .unwrap_or(0);

    Ok(evaluate_sell(
        profit,
        current,
        stop_line,
        ctx.config.trading.sell_up_rate,
        ctx.config.trading.sell_down_rate,
        ctx.config.trading.use_loss_cut,
        item_name,
    ))
}

/// 止盈/止损判定。
/// 到达止盈线后只有跌破支撑（移动止盈）才兑现利润；
/// 止损开启时跌破 down_rate 立即离场。
pub fn evaluate_sell(
    profit: f64,
    current: i32,
    stop_line: i32,
    up_rate: f64,
    down_rate: f64,
    use_loss_cut: bool,
    item_name: &str,
) -> bool {
    // 配置不自洽（亏损却配了正的止损线等）时一律不动
    if (profit < 0.0 && down_rate > 0.0) || (profit > 0.0 && up_rate < 0.0) {
        return false;
    }

    if profit >= up_rate {
        // 没有支撑参考时直接止盈
        if stop_line == 0 {
            return true;
        }
        if current < stop_line {
            tracing::info!(
                "移动止盈触发: {} profit={}%, current={}, stopLine={}",
                item_name,
                profit,
                current,
                stop_line
            );
            return true;
        }
        return false;
    }

    if use_loss_cut && profit <= down_rate {
        tracing::info!(
            "止损触发: {} profit={}%, limit={}%",
            item_name,
            profit,
            down_rate
        );
        return true;
    }

    false
}

/// 卖出基准线：优先 S1，S1 缺失/非正时用 S2、S3 的均值兜底
pub fn stop_line_price(s1: Option<i32>, s2: Option<i32>, s3: Option<i32>) -> i32 {
    if let Some(p) = s1 {
        if p > 0 {
            return p;
        }
    }
    let present: Vec<i64> = [s2, s3].iter().flatten().map(|v| *v as i64).collect();
    if present.is_empty() {
        return 0;
    }
    (present.iter().sum::<i64>() / present.len() as i64) as i32
}

/// 收益率（%），四舍五入到小数点后两位
pub fn calculate_profit(bought_price: f64, current_price: f64) -> f64 {
    if bought_price == 0.0 {
        return 0.0;
    }
    let profit = (current_price - bought_price) / bought_price * 100.0;
    (profit * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profit_rounding() {
        assert_eq!(calculate_profit(10000.0, 11500.0), 15.0);
        assert_eq!(calculate_profit(9000.0, 9123.0), 1.37);
        assert_eq!(calculate_profit(0.0, 11500.0), 0.0);
        assert_eq!(calculate_profit(10000.0, 7500.0), -25.0);
    }

    #[test]
    fn test_stop_line_prefers_s1() {
        assert_eq!(stop_line_price(Some(11600), Some(11000), Some(10800)), 11600);
        // s1 missing → mean of the rest
        assert_eq!(stop_line_price(None, Some(11000), Some(10800)), 10900);
        assert_eq!(stop_line_price(Some(0), Some(11000), None), 11000);
        assert_eq!(stop_line_price(None, None, None), 0);
    }

    #[test]
    fn test_trailing_stop_sell() {
        // profit 15% ≥ up_rate 10, current 11500 below stop 11600 → sell
        assert!(evaluate_sell(15.0, 11500, 11600, 10.0, -20.0, false, "test"));
        // still above the stop line → keep riding
        assert!(!evaluate_sell(15.0, 11700, 11600, 10.0, -20.0, false, "test"));
        // no stop line at all → take the profit
        assert!(evaluate_sell(15.0, 11500, 0, 10.0, -20.0, false, "test"));
    }

    #[test]
    fn test_loss_cut_disabled() {
        // profit -25% below down_rate -20 but loss cut off → hold
        assert!(!evaluate_sell(-25.0, 7500, 0, 10.0, -20.0, false, "test"));
        assert!(evaluate_sell(-25.0, 7500, 0, 10.0, -20.0, true, "test"));
        // above the loss line → hold even with loss cut on
        assert!(!evaluate_sell(-10.0, 9000, 0, 10.0, -20.0, true, "test"));
    }

    #[test]
    fn test_inconsistent_rates_never_sell() {
        assert!(!evaluate_sell(-5.0, 9500, 0, 10.0, 20.0, true, "test"));
        assert!(!evaluate_sell(5.0, 10500, 0, -10.0, -20.0, true, "test"));
    }
}
