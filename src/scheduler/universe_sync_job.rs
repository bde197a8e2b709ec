use std::sync::Arc;

use chrono_tz::Asia::Seoul;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{JobBuilder, JobScheduler};

use crate::app::AppContext;
use crate::services::universe_service;
use crate::services::universe_service::Market;

/// 注册股票池刷新任务（每月 1 日首尔时间 06:00）
pub async fn create_universe_sync_job(
    scheduler: &JobScheduler,
    ctx: AppContext,
) -> Result<(), Box<dyn std::error::Error>> {
    let lock = Arc::new(Mutex::new(()));

    let job = JobBuilder::new()
        .with_timezone(Seoul)
        .with_cron_job_type()
        .with_schedule("0 0 6 1 * *")?
        .with_run_async(Box::new(move |_uuid, _l| {
            let ctx = ctx.clone();
            let lock = lock.clone();
            Box::pin(async move {
                let Ok(_guard) = lock.try_lock() else {
                    tracing::warn!("universe_sync 上一轮还在执行, 本轮丢弃");
                    return;
                };
                if let Err(e) = run_universe_sync_task(&ctx).await {
                    tracing::error!("universe_sync 任务失败: {}", e);
                    ctx.notifier.send(&format!("universe sync failed: {e}")).await;
                }
            })
        }))
        .build()?;

    scheduler.add(job).await?;
    tracing::info!("universe_sync 定时任务已注册（每月 1 日首尔时间 06:00）");
    Ok(())
}

pub async fn run_universe_sync_task(ctx: &AppContext) -> anyhow::Result<()> {
    tracing::info!("开始执行 universe_sync 任务");
    ctx.notifier.send("universe sync start").await;

    let kospi = universe_service::sync_market(&ctx.db_pool, &ctx.http, &ctx.config.krx, Market::Kospi).await?;
    let kosdaq = universe_service::sync_market(&ctx.db_pool, &ctx.http, &ctx.config.krx, Market::Kosdaq).await?;

    ctx.notifier
        .send(&format!(
            "universe sync end (KOSPI +{}, KOSDAQ +{})",
            kospi.inserted_count, kosdaq.inserted_count
        ))
        .await;
    Ok(())
}
