use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

use crate::kis::api::KisApi;
use crate::services::notify_service::Notifier;
use crate::utils::config::AppConfig;
use crate::workers::TickerLocks;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// 所有任务共享的运行时上下文，clone 代价低（内部都是 Arc/池句柄）
#[derive(Clone)]
pub struct AppContext {
    pub db_pool: DbPool,
    pub config: AppConfig,
    pub kis: KisApi,
    /// 券商以外的普通 HTTP 调用（交易所参考数据等）
    pub http: reqwest::Client,
    pub notifier: Notifier,
    pub ticker_locks: TickerLocks,
}
