use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use chrono_tz::Asia::Seoul;
use serde_json::{json, Value};

use super::error::KisError;
use crate::utils::config::BrokerConfig;

/// 券商 access token 的有效期按 24 小时政策签发，本地按 23 小时记账，
/// 留出时钟偏差的余量。
const TOKEN_TTL_HOURS: i64 = 23;

/// 返回前要求 token 至少还有这么久的剩余寿命
const MIN_REMAINING_SECS: i64 = 60;

/// 刷新失败重试次数（共 1 + MAX_REFRESH_RETRIES 次尝试）
const MAX_REFRESH_RETRIES: usize = 2;

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: NaiveDateTime,
}

impl IssuedToken {
    fn is_usable(&self, now: NaiveDateTime) -> bool {
        !self.token.is_empty() && self.expires_at > now + Duration::seconds(MIN_REMAINING_SECS)
    }
}

/// 实际发起 OAuth2 刷新的抽象，便于测试注入计数用的假实现
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn issue(&self) -> Result<IssuedToken, KisError>;
}

/// KIS OAuth2 client_credentials 端点
pub struct OauthTokenSource {
    http: reqwest::Client,
    base_url: String,
    app_key: String,
    app_secret: String,
}

impl OauthTokenSource {
    pub fn new(http: reqwest::Client, broker: &BrokerConfig) -> Self {
        Self {
            http,
            base_url: broker.quote_base().to_string(),
            app_key: broker.app_key.clone(),
            app_secret: broker.app_secret.clone(),
        }
    }
}

#[async_trait]
impl TokenSource for OauthTokenSource {
    async fn issue(&self) -> Result<IssuedToken, KisError> {
        let url = format!("{}/oauth2/tokenP", self.base_url);
        let body = json!({
            "grant_type": "client_credentials",
            "appkey": self.app_key,
            "appsecret": self.app_secret,
        });

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| KisError::TokenFailure(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(KisError::TokenFailure(format!("http status {}", status.as_u16())));
        }

        let payload: Value = resp
            .json()
            .await
            .map_err(|e| KisError::TokenFailure(format!("decode failed: {e}")))?;

        let token = payload
            .get("access_token")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        if token.is_empty() {
            return Err(KisError::TokenFailure("empty access_token".to_string()));
        }

        Ok(IssuedToken {
            token,
            expires_at: now_seoul() + Duration::hours(TOKEN_TTL_HOURS),
        })
    }
}

/// token 管理器：内存缓存 + 文本文件持久化 + 单飞刷新。
///
/// 文件格式两行：第一行 token，第二行 ISO-8601 本地时间的过期时刻；
/// 缺行或解析失败一律视为无 token。
pub struct TokenManager {
    source: Box<dyn TokenSource>,
    store_path: PathBuf,
    cached: tokio::sync::Mutex<Option<IssuedToken>>,
}

impl TokenManager {
    pub fn new(source: Box<dyn TokenSource>, store_path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            store_path: store_path.into(),
            cached: tokio::sync::Mutex::new(None),
        }
    }

    /// 取一个剩余寿命 ≥ 1 分钟的 token。
    ///
    /// 整个检查-刷新流程都在同一把锁内完成，刷新期间到达的并发调用
    /// 会在锁上等待同一次网络刷新的结果（单飞）。
    pub async fn get_token(&self) -> Result<String, KisError> {
        let mut cached = self.cached.lock().await;
        let now = now_seoul();

        if let Some(tok) = cached.as_ref() {
            if tok.is_usable(now) {
                return Ok(tok.token.clone());
            }
        }

        // 进程刚启动时先看磁盘，避免每次重启都白白消耗一次签发
        if cached.is_none() {
            if let Some(tok) = load_store(&self.store_path) {
                if tok.is_usable(now) {
                    let value = tok.token.clone();
                    *cached = Some(tok);
                    return Ok(value);
                }
            }
        }

        let tok = self.refresh().await?;
        if let Err(e) = save_store(&self.store_path, &tok) {
            tracing::warn!("token 文件写入失败: {}", e);
        }
        let value = tok.token.clone();
        *cached = Some(tok);
        Ok(value)
    }

    async fn refresh(&self) -> Result<IssuedToken, KisError> {
        let mut last_err = None;
        for attempt in 0..=MAX_REFRESH_RETRIES {
            match self.source.issue().await {
                Ok(tok) => {
                    tracing::info!("access token 刷新成功, 有效期至 {}", tok.expires_at);
                    return Ok(tok);
                }
                Err(e) => {
                    tracing::warn!("access token 刷新失败 (第 {} 次): {}", attempt + 1, e);
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| KisError::TokenFailure("refresh failed".to_string())))
    }
}

fn now_seoul() -> NaiveDateTime {
    Utc::now().with_timezone(&Seoul).naive_local()
}

const EXPIRY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

fn load_store(path: &Path) -> Option<IssuedToken> {
    let content = std::fs::read_to_string(path).ok()?;
    let mut lines = content.lines();
    let token = lines.next()?.trim().to_string();
    let expiry_line = lines.next()?.trim();
    if token.is_empty() || expiry_line.is_empty() {
        return None;
    }
    let expires_at = NaiveDateTime::parse_from_str(expiry_line, EXPIRY_FORMAT).ok()?;
    Some(IssuedToken { token, expires_at })
}

fn save_store(path: &Path, tok: &IssuedToken) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(
        path,
        format!("{}\n{}", tok.token, tok.expires_at.format(EXPIRY_FORMAT)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        issued: Arc<AtomicUsize>,
        fail_times: usize,
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn issue(&self) -> Result<IssuedToken, KisError> {
            let n = self.issued.fetch_add(1, Ordering::SeqCst);
            // simulate a slow network round-trip so concurrent callers overlap
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            if n < self.fail_times {
                return Err(KisError::TokenFailure("boom".to_string()));
            }
            Ok(IssuedToken {
                token: format!("token-{n}"),
                expires_at: now_seoul() + Duration::hours(TOKEN_TTL_HOURS),
            })
        }
    }

    fn manager_with(
        dir: &tempfile::TempDir,
        issued: Arc<AtomicUsize>,
        fail_times: usize,
    ) -> TokenManager {
        TokenManager::new(
            Box::new(CountingSource { issued, fail_times }),
            dir.path().join("token.txt"),
        )
    }

    #[tokio::test]
    async fn test_single_flight_refresh() {
        let dir = tempfile::TempDir::new().unwrap();
        let issued = Arc::new(AtomicUsize::new(0));
        let mgr = Arc::new(manager_with(&dir, issued.clone(), 0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let m = mgr.clone();
            handles.push(tokio::spawn(async move { m.get_token().await }));
        }
        for h in handles {
            assert!(h.await.unwrap().is_ok());
        }
        // eight concurrent callers, exactly one network refresh
        assert_eq!(issued.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let issued = Arc::new(AtomicUsize::new(0));
        {
            let mgr = manager_with(&dir, issued.clone(), 0);
            assert_eq!(mgr.get_token().await.unwrap(), "token-0");
        }
        // a fresh manager reads the file instead of issuing again
        let mgr = manager_with(&dir, issued.clone(), 0);
        assert_eq!(mgr.get_token().await.unwrap(), "token-0");
        assert_eq!(issued.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_partial_store_triggers_refresh() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("token.txt");
        std::fs::write(&path, "only-a-token-line").unwrap();

        let issued = Arc::new(AtomicUsize::new(0));
        let mgr = TokenManager::new(
            Box::new(CountingSource { issued: issued.clone(), fail_times: 0 }),
            path,
        );
        assert_eq!(mgr.get_token().await.unwrap(), "token-0");
        assert_eq!(issued.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_retries_then_succeeds() {
        let dir = tempfile::TempDir::new().unwrap();
        let issued = Arc::new(AtomicUsize::new(0));
        let mgr = manager_with(&dir, issued.clone(), 2);
        // two failures are absorbed by the retry budget
        assert!(mgr.get_token().await.is_ok());
        assert_eq!(issued.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_refresh_exhaustion_surfaces_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let issued = Arc::new(AtomicUsize::new(0));
        let mgr = manager_with(&dir, issued.clone(), 10);
        let err = mgr.get_token().await.unwrap_err();
        assert!(matches!(err, KisError::TokenFailure(_)));
        assert_eq!(issued.load(Ordering::SeqCst), 3);
    }
}
