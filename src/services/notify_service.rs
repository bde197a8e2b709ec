use serde_json::json;

/// 通知走 webhook，best-effort：失败只记日志，绝不影响交易/采集主流程。
#[derive(Clone)]
pub struct Notifier {
    http: reqwest::Client,
    webhook_url: String,
}

impl Notifier {
    pub fn new(http: reqwest::Client, webhook_url: String) -> Self {
        Self { http, webhook_url }
    }

    pub async fn send(&self, msg: &str) {
        let payload = json!({ "text": msg });
        match self.http.post(&self.webhook_url).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!("通知发送成功: {}", msg);
            }
            Ok(resp) => {
                tracing::error!("通知发送失败 ({}): {}", resp.status(), msg);
            }
            Err(e) => {
                tracing::error!("通知请求异常: {}", e);
            }
        }
    }
}
