use crate::app::AppContext;
use crate::kis::api::OrderSide;
use crate::models::{PriceUpdate, TradeInfo};
use crate::repositories::{trade_history, trade_info, trade_status};
use crate::services::{trade_info_service, worker_service};
use crate::services::worker_service::STRATEGY_SWING;
use crate::utils::date_utils;

/// 盘中买入 tick：同步持仓 → 遍历当日候选 → 回踩支撑带下方则限价买入。
pub async fn exec_buy_task(ctx: &AppContext) -> anyhow::Result<()> {
    // 1. 没钱就什么都不做
    let cash = worker_service::effective_cash(&ctx.kis).await?;
    if cash == 0 {
        tracing::warn!("账户无可用资金, 跳过买入");
        return Ok(());
    }

    // 2. 先把券商侧持仓同步回本地
    let today = date_utils::today_string();
    worker_service::reconcile_holdings(ctx, &today, ctx.config.trading.limit_price).await?;

    // 3. 配置关掉买入就到此为止
    if !ctx.config.trading.buy_use {
        tracing::info!("买入开关未启用");
        return Ok(());
    }

    let candidates = {
        let mut conn = ctx.db_pool.get()?;
        trade_info::find_buy_candidates(&mut conn, &today)?
    };
    if candidates.is_empty() {
        tracing::debug!("今日没有买入候选");
        return Ok(());
    }

    // 单只失败不影响其它候选
    for info in &candidates {
        if let Err(e) = process_buy_item(ctx, info, cash, &today).await {
            tracing::error!("买入处理失败: {} - {}", info.item_cd, e);
        }
    }
    Ok(())
}

async fn process_buy_item(
    ctx: &AppContext,
    info: &TradeInfo,
    cash: i64,
    today: &str,
) -> anyhow::Result<()> {
    let code = &info.item_cd;
    let cd_type = if info.cd_type.is_empty() { STRATEGY_SWING } else { info.cd_type.as_str() };

    // 与卖出 tick 互斥，拿不到锁说明对侧正在处理，放弃本轮
    let Some(_guard) = ctx.ticker_locks.try_acquire(code) else {
        tracing::debug!("锁竞争, 本轮跳过: {}", code);
        return Ok(());
    };

    // 1. 持仓只数限制（已持有的可以加仓）
    if !can_open_position(ctx, code, today)? {
        tracing::info!(
            "持仓数已达上限 ({}), 跳过: {}",
            ctx.config.trading.limit_cnt,
            code
        );
        return Ok(());
    }

    // 2. 实时现价。盘前/异常拿不到现价就中断
    let price = worker_service::current_price_info(&ctx.kis, code).await?;
    if price.stck_prpr == 0 {
        return Ok(());
    }

    {
        let mut conn = ctx.db_pool.get()?;
        // 3. 回写现价
        trade_info::update_price(
            &mut conn,
            code,
            today,
            &PriceUpdate {
                stck_prpr: Some(price.stck_prpr),
                stck_oprc: Some(price.stck_oprc),
            },
        )?;
        // 4. 盘中高低点在变，枢轴也要跟着重算
        trade_info_service::refresh_pivots(
            &mut conn,
            code,
            today,
            price.stck_oprc,
            price.stck_hgpr,
            price.stck_lwpr,
            cd_type,
        )?;

        // 5. 当日已提交过买入就不再加单
        if trade_history::find_bought(&mut conn, code, today)?.is_some() {
            return Ok(());
        }
    }

    if !ctx.config.trading.test_force_buy {
        // 6. 现价要落在支撑带均值下方才算回踩买点
        let fresh = {
            let mut conn = ctx.db_pool.get()?;
            trade_info::find_by_key(&mut conn, code, today)?
        };
        let Some(fresh) = fresh else {
            return Ok(());
        };
        let target_support = average_price(&[fresh.s1, fresh.s2, fresh.s3]);
        let target_resist = average_price(&[fresh.r1, fresh.r2, fresh.r3]);
        tracing::info!(
            "买点分析: item={}, current={}, target(S_avg)={}, target(R_avg)={}",
            code,
            price.stck_prpr,
            target_support,
            target_resist
        );
        if target_support <= 0 || price.stck_prpr >= target_support {
            return Ok(());
        }
    } else {
        tracing::warn!("[TEST MODE] 强制买入: {} 跳过买点校验", code);
    }

    // 7. 按资金比例分配数量后下单
    let qty = buy_quantity(cash, ctx.config.trading.contract_rate, price.stck_prpr);
    if qty == 0 {
        return Ok(());
    }
    worker_service::submit_order(ctx, code, qty, price.stck_prpr, OrderSide::Buy).await?;
    Ok(())
}

/// 持仓只数达到上限后，只允许已持有的股票继续加仓
fn can_open_position(ctx: &AppContext, code: &str, today: &str) -> anyhow::Result<bool> {
    let mut conn = ctx.db_pool.get()?;
    let holding = trade_status::find_bought(&mut conn, today)?;
    if holding.len() >= ctx.config.trading.limit_cnt {
        return Ok(holding.iter().any(|s| s.item_cd == *code));
    }
    Ok(true)
}

/// 几个价位的均值，None 不参与；全空返回 0。整数截断。
pub fn average_price(values: &[Option<i32>]) -> i32 {
    let present: Vec<i64> = values.iter().flatten().map(|v| *v as i64).collect();
    if present.is_empty() {
        return 0;
    }
    (present.iter().sum::<i64>() / present.len() as i64) as i32
}

/// 可用资金 × 比例得到本次预算，再换算成股数。
/// 预算不够一股但总资金够一股时，退化为买 1 股。
pub fn buy_quantity(cash: i64, contract_rate: f64, price: i32) -> i32 {
    if price <= 0 {
        return 0;
    }
    let allocation = (cash as f64 * contract_rate) as i64;
    let qty = allocation / price as i64;
    if qty == 0 {
        if cash >= price as i64 {
            return 1;
        }
        return 0;
    }
    qty as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_price_ignores_none() {
        assert_eq!(average_price(&[Some(8900), Some(8800), Some(8700)]), 8800);
        assert_eq!(average_price(&[Some(8900), None, Some(8700)]), 8800);
        assert_eq!(average_price(&[None, None, None]), 0);
        // integer truncation
        assert_eq!(average_price(&[Some(10), Some(11)]), 10);
    }

    #[test]
    fn test_buy_quantity_allocation() {
        // 1,000,000 × 0.1 = 100,000 budget → 100,000 / 8,750 = 11
        assert_eq!(buy_quantity(1_000_000, 0.1, 8750), 11);
    }

    #[test]
    fn test_buy_quantity_single_share_fallback() {
        // budget 10,000 < price but total cash covers one share
        assert_eq!(buy_quantity(100_000, 0.1, 50_000), 1);
        // cash cannot even buy one share
        assert_eq!(buy_quantity(30_000, 0.1, 50_000), 0);
    }

    #[test]
    fn test_buy_quantity_zero_price() {
        assert_eq!(buy_quantity(1_000_000, 0.1, 0), 0);
    }
}
