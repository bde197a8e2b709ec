use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;

use super::error::KisError;
use super::token::TokenManager;
use crate::utils::config::BrokerConfig;

/// 进程级调用间隔闸门。
///
/// 所有出站调用共享同一个上次放行时刻，锁内完成等待+记账，
/// 保证任意两次请求的发出间隔 ≥ min_interval，吞吐上限与并发数无关。
pub struct RateGate {
    last: tokio::sync::Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last: tokio::sync::Mutex::new(None),
            min_interval,
        }
    }

    pub async fn acquire(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// HTTP 调用超时
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// 相邻调用最小间隔
const CALL_INTERVAL: Duration = Duration::from_millis(1000);
/// 失败重试前的等待
const RETRY_INTERVAL: Duration = Duration::from_millis(1000);
/// 最大尝试次数
const MAX_ATTEMPTS: usize = 3;

/// 网关限流时响应体中出现的错误码
const RATE_LIMIT_SENTINEL: &str = "EGW00201";

struct ClientInner {
    http: reqwest::Client,
    token: TokenManager,
    app_key: String,
    app_secret: String,
    gate: RateGate,
}

/// 限速 + 有界重试的 KIS HTTP 客户端。
/// 克隆代价低，适配器层可以随意 clone 后在任务间传递。
#[derive(Clone)]
pub struct KisClient {
    inner: Arc<ClientInner>,
}

impl KisClient {
    pub fn new(token: TokenManager, broker: &BrokerConfig) -> Result<Self, KisError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                token,
                app_key: broker.app_key.clone(),
                app_secret: broker.app_secret.clone(),
                gate: RateGate::new(CALL_INTERVAL),
            }),
        })
    }

    /// GET：query 直接拼在 path 后
    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &str,
        tr_id: &str,
    ) -> Result<T, KisError> {
        let full = format!("{url}{query}");
        self.call(reqwest::Method::GET, &full, None, tr_id).await
    }

    /// POST：JSON 请求体
    pub async fn post<T: DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
        tr_id: &str,
    ) -> Result<T, KisError> {
        self.call(reqwest::Method::POST, url, Some(body), tr_id).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<serde_json::Value>,
        tr_id: &str,
    ) -> Result<T, KisError> {
        let token = self.inner.token.get_token().await?;

        let mut last_err = None;
        for attempt in 1..=MAX_ATTEMPTS {
            self.inner.gate.acquire().await;

            match self.send(method.clone(), url, body.as_ref(), tr_id, &token).await {
                Ok(parsed) => return Ok(parsed),
                Err(e) if e.is_retryable() => {
                    tracing::warn!("KIS 调用失败 (第 {} 次, tr_id={}): {}", attempt, tr_id, e);
                    last_err = Some(e);
                    tokio::time::sleep(RETRY_INTERVAL).await;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::error!("KIS 调用超过最大重试次数: tr_id={}", tr_id);
        Err(last_err.unwrap_or(KisError::RateExceeded))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&serde_json::Value>,
        tr_id: &str,
        token: &str,
    ) -> Result<T, KisError> {
        let mut req = self
            .inner
            .http
            .request(method, url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {token}"))
            .header("appkey", &self.inner.app_key)
            .header("appsecret", &self.inner.app_secret)
            .header("tr_id", tr_id);

        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            if text.contains(RATE_LIMIT_SENTINEL) {
                return Err(KisError::RateExceeded);
            }
            return Err(KisError::HttpStatus(status.as_u16()));
        }

        Ok(serde_json::from_str::<T>(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_gate_spacing() {
        let gate = Arc::new(RateGate::new(Duration::from_millis(50)));
        let stamps = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let g = gate.clone();
            let s = stamps.clone();
            handles.push(tokio::spawn(async move {
                g.acquire().await;
                s.lock().await.push(Instant::now());
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let mut times = stamps.lock().await.clone();
        times.sort();
        for pair in times.windows(2) {
            let gap = pair[1].duration_since(pair[0]);
            // scheduling jitter tolerance
            assert!(gap >= Duration::from_millis(45), "gap too small: {gap:?}");
        }
    }

    #[tokio::test]
    async fn test_rate_gate_first_call_immediate() {
        let gate = RateGate::new(Duration::from_millis(200));
        let start = Instant::now();
        gate.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
