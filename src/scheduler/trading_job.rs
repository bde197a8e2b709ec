use std::sync::Arc;

use chrono_tz::Asia::Seoul;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{JobBuilder, JobScheduler};

use crate::app::AppContext;
use crate::workers::{buy_task, sell_task};

/// 盘中任务的节拍：开市时段（09:00–15:59）每 30 秒
const TRADING_CRON: &str = "0/30 * 9-15 * * *";

/// 注册盘中买入/卖出任务。
/// 两个任务各自持锁防重入；同一只股票的买卖互斥由 TickerLocks 保证。
pub async fn create_trading_jobs(
    scheduler: &JobScheduler,
    ctx: AppContext,
) -> Result<(), Box<dyn std::error::Error>> {
    let buy_lock = Arc::new(Mutex::new(()));
    let buy_ctx = ctx.clone();
    let buy_job = JobBuilder::new()
        .with_timezone(Seoul)
        .with_cron_job_type()
        .with_schedule(TRADING_CRON)?
        .with_run_async(Box::new(move |_uuid, _l| {
            let ctx = buy_ctx.clone();
            let lock = buy_lock.clone();
            Box::pin(async move {
                let Ok(_guard) = lock.try_lock() else {
                    tracing::debug!("buy tick 上一轮还在执行, 本轮丢弃");
                    return;
                };
                if let Err(e) = buy_task::exec_buy_task(&ctx).await {
                    tracing::error!("buy tick 失败: {}", e);
                }
            })
        }))
        .build()?;
    scheduler.add(buy_job).await?;

    let sell_lock = Arc::new(Mutex::new(()));
    let sell_ctx = ctx;
    let sell_job = JobBuilder::new()
        .with_timezone(Seoul)
        .with_cron_job_type()
        .with_schedule(TRADING_CRON)?
        .with_run_async(Box::new(move |_uuid, _l| {
            let ctx = sell_ctx.clone();
            let lock = sell_lock.clone();
            Box::pin(async move {
                let Ok(_guard) = lock.try_lock() else {
                    tracing::debug!("sell tick 上一轮还在执行, 本轮丢弃");
                    return;
                };
                if let Err(e) = sell_task::exec_sell_task(&ctx).await {
                    tracing::error!("sell tick 失败: {}", e);
                }
            })
        }))
        .build()?;
    scheduler.add(sell_job).await?;

    tracing::info!("盘中买卖定时任务已注册（09:00–15:59 每 30 秒, Asia/Seoul）");
    Ok(())
}
