use std::sync::Arc;

use chrono_tz::Asia::Seoul;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{JobBuilder, JobScheduler};

use crate::app::AppContext;
use crate::services::ingest_service;
use crate::services::universe_service::Market;

/// 注册收盘后的批量采集任务。
/// KOSDAQ 16:00、KOSPI 17:00（首尔时间）错峰跑，两个任务各自持锁。
pub async fn create_market_ingest_jobs(
    scheduler: &JobScheduler,
    ctx: AppContext,
) -> Result<(), Box<dyn std::error::Error>> {
    add_ingest_job(scheduler, ctx.clone(), Market::Kosdaq, "0 0 16 * * *").await?;
    add_ingest_job(scheduler, ctx, Market::Kospi, "0 0 17 * * *").await?;
    tracing::info!("行情采集定时任务已注册（KOSDAQ 16:00 / KOSPI 17:00, Asia/Seoul）");
    Ok(())
}

async fn add_ingest_job(
    scheduler: &JobScheduler,
    ctx: AppContext,
    market: Market,
    cron: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let lock = Arc::new(Mutex::new(()));

    let job = JobBuilder::new()
        .with_timezone(Seoul)
        .with_cron_job_type()
        .with_schedule(cron)?
        .with_run_async(Box::new(move |_uuid, _l| {
            let ctx = ctx.clone();
            let lock = lock.clone();
            Box::pin(async move {
                let Ok(_guard) = lock.try_lock() else {
                    tracing::warn!("{} 采集上一轮还在执行, 本轮丢弃", market.as_tag());
                    return;
                };
                if let Err(e) = run_market_ingest_task(&ctx, market).await {
                    tracing::error!("{} 采集任务失败: {}", market.as_tag(), e);
                    ctx.notifier
                        .send(&format!("{} ingest failed: {e}", market.as_tag()))
                        .await;
                }
            })
        }))
        .build()?;

    scheduler.add(job).await?;
    Ok(())
}

pub async fn run_market_ingest_task(ctx: &AppContext, market: Market) -> anyhow::Result<()> {
    ctx.notifier
        .send(&format!("{} ingest start", market.as_tag()))
        .await;

    let result = ingest_service::ingest_market(ctx, market).await?;

    ctx.notifier
        .send(&format!(
            "{} ingest end (total {}, ok {}, failed {})",
            market.as_tag(),
            result.total_count,
            result.success_count,
            result.failed_count
        ))
        .await;
    Ok(())
}
