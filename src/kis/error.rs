use thiserror::Error;

/// 券商接入层的错误分类。
/// Network/HttpStatus(5xx)/RateExceeded 由客户端重试，其余直接上抛。
#[derive(Debug, Error)]
pub enum KisError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("rate limit exceeded (EGW00201)")]
    RateExceeded,
    #[error("token failure: {0}")]
    TokenFailure(String),
    #[error("broker rejected order: rt_cd={rt_cd}, msg1={msg1}")]
    BrokerReject { rt_cd: String, msg1: String },
    #[error("data missing: {0}")]
    DataMissing(String),
    #[error("invalid argument: {0}")]
    ArgumentInvalid(String),
}

impl KisError {
    /// 客户端层面可重试的错误：网络异常、5xx、网关限流
    pub fn is_retryable(&self) -> bool {
        match self {
            KisError::Network(_) | KisError::RateExceeded => true,
            KisError::HttpStatus(code) => *code >= 500,
            _ => false,
        }
    }
}
