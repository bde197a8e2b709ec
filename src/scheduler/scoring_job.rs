use std::sync::Arc;

use chrono_tz::Asia::Seoul;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{JobBuilder, JobScheduler};

use crate::app::AppContext;
use crate::services::scorer_service;

/// 注册打分任务（每天首尔时间 05:00，保证昨日两个市场的采集都已结束）
pub async fn create_scoring_job(
    scheduler: &JobScheduler,
    ctx: AppContext,
) -> Result<(), Box<dyn std::error::Error>> {
    let lock = Arc::new(Mutex::new(()));

    let job = JobBuilder::new()
        .with_timezone(Seoul)
        .with_cron_job_type()
        .with_schedule("0 0 5 * * *")?
        .with_run_async(Box::new(move |_uuid, _l| {
            let ctx = ctx.clone();
            let lock = lock.clone();
            Box::pin(async move {
                let Ok(_guard) = lock.try_lock() else {
                    tracing::warn!("scoring 上一轮还在执行, 本轮丢弃");
                    return;
                };
                if let Err(e) = run_scoring_task(&ctx).await {
                    tracing::error!("scoring 任务失败: {}", e);
                    ctx.notifier.send(&format!("scoring failed: {e}")).await;
                }
            })
        }))
        .build()?;

    scheduler.add(job).await?;
    tracing::info!("scoring 定时任务已注册（每天首尔时间 05:00）");
    Ok(())
}

pub async fn run_scoring_task(ctx: &AppContext) -> anyhow::Result<()> {
    ctx.notifier.send("swing scoring start").await;

    let result = scorer_service::run_swing_scoring(ctx)?;

    ctx.notifier
        .send(&format!(
            "swing scoring end (scored {}, selected {}, failed {})",
            result.total_count, result.selected_count, result.failed_count
        ))
        .await;
    Ok(())
}
