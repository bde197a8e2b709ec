mod app;
mod kis;
mod models;
mod repositories;
mod scheduler;
mod schema;
mod services;
mod utils;
mod workers;

use std::time::Duration;

use app::AppContext;
use kis::api::KisApi;
use kis::client::KisClient;
use kis::token::{OauthTokenSource, TokenManager};
use services::notify_service::Notifier;
use utils::config::AppConfig;
use workers::TickerLocks;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    utils::logging::init_logging();

    let config = AppConfig::from_env();

    // 构建 DB 连接池
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
    let manager = diesel::r2d2::ConnectionManager::<diesel::pg::PgConnection>::new(database_url);
    let db_pool_max: u32 = std::env::var("DB_POOL_MAX")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(20);
    let db_pool_min: Option<u32> = std::env::var("DB_POOL_MIN").ok().and_then(|v| v.parse().ok());
    let mut pool_builder = diesel::r2d2::Pool::builder().max_size(db_pool_max);
    if let Some(min_idle) = db_pool_min {
        pool_builder = pool_builder.min_idle(Some(min_idle));
    }
    let db_pool = pool_builder.build(manager).expect("Failed to create DB pool");

    // 券商客户端：token 管理 + 限速客户端 + 类型化适配层
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create HTTP client");
    let token_source = OauthTokenSource::new(http.clone(), &config.broker);
    let token_manager = TokenManager::new(Box::new(token_source), config.token_file_path.clone());
    let kis_client = KisClient::new(token_manager, &config.broker).expect("Failed to create KIS client");
    let kis = KisApi::new(kis_client, config.broker.clone());

    let notifier = Notifier::new(http.clone(), config.notify_webhook_url.clone());

    let ctx = AppContext {
        db_pool,
        config,
        kis,
        http,
        notifier,
        ticker_locks: TickerLocks::new(),
    };

    // 启动定时调度器
    let sched = tokio_cron_scheduler::JobScheduler::new().await.expect("创建调度器失败");

    if let Err(e) = scheduler::universe_sync_job::create_universe_sync_job(&sched, ctx.clone()).await {
        tracing::error!("创建 universe_sync 任务失败: {}", e);
    }

    if let Err(e) = scheduler::market_ingest_job::create_market_ingest_jobs(&sched, ctx.clone()).await {
        tracing::error!("创建行情采集任务失败: {}", e);
    }

    if let Err(e) = scheduler::scoring_job::create_scoring_job(&sched, ctx.clone()).await {
        tracing::error!("创建打分任务失败: {}", e);
    }

    if let Err(e) = scheduler::trading_job::create_trading_jobs(&sched, ctx.clone()).await {
        tracing::error!("创建盘中买卖任务失败: {}", e);
    }

    sched.start().await.expect("启动调度器失败");
    tracing::info!("定时任务调度器已启动");

    tokio::signal::ctrl_c().await.expect("failed to listen for ctrl-c");
    tracing::info!("收到退出信号, 关闭中");
}
