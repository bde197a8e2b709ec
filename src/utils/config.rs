use std::str::FromStr;

/// 实盘/模拟盘两套端点族的选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerMode {
    Real,
    Mock,
}

#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub base_url_real: String,
    pub base_url_mock: String,
    pub app_key: String,
    pub app_secret: String,
    pub account_no: String,
    pub account_product: String,
    pub mode: BrokerMode,
}

impl BrokerConfig {
    /// 行情/财务查询只有实盘域名提供
    pub fn quote_base(&self) -> &str {
        &self.base_url_real
    }

    /// 账户/下单按模式切换实盘或模拟盘域名
    pub fn trading_base(&self) -> &str {
        match self.mode {
            BrokerMode::Real => &self.base_url_real,
            BrokerMode::Mock => &self.base_url_mock,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KrxConfig {
    pub kospi_url: String,
    pub kosdaq_url: String,
    pub auth_key: String,
}

#[derive(Debug, Clone)]
pub struct TradingConfig {
    pub contract_rate: f64,
    pub limit_price: i64,
    pub limit_cnt: usize,
    pub buy_use: bool,
    pub test_force_buy: bool,
    pub sell_up_rate: f64,
    pub sell_down_rate: f64,
    pub use_loss_cut: bool,
    pub sell_hold_rate: f64,
    pub test_force_sell: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub broker: BrokerConfig,
    pub krx: KrxConfig,
    pub notify_webhook_url: String,
    pub trading: TradingConfig,
    pub token_file_path: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mode = match require("BROKER_MODE").to_ascii_lowercase().as_str() {
            "real" => BrokerMode::Real,
            _ => BrokerMode::Mock,
        };

        Self {
            broker: BrokerConfig {
                base_url_real: require("BROKER_BASE_URL_REAL"),
                base_url_mock: require("BROKER_BASE_URL_MOCK"),
                app_key: require("BROKER_APP_KEY"),
                app_secret: require("BROKER_APP_SECRET"),
                account_no: require("BROKER_ACCOUNT_NO"),
                account_product: require("BROKER_ACCOUNT_PRODUCT"),
                mode,
            },
            krx: KrxConfig {
                kospi_url: require("KRX_KOSPI_URL"),
                kosdaq_url: require("KRX_KOSDAQ_URL"),
                auth_key: require("KRX_AUTH_KEY"),
            },
            notify_webhook_url: require("NOTIFY_WEBHOOK_URL"),
            trading: TradingConfig {
                contract_rate: parse_or("TRADING_CONTRACT_RATE", 0.1),
                limit_price: parse_or("TRADING_LIMIT_PRICE", 1_000_000),
                limit_cnt: parse_or("TRADING_LIMIT_CNT", 5),
                buy_use: yn("TRADING_BUY_USE_YN", false),
                test_force_buy: yn("TRADING_BUY_TEST_FORCE_BUY", false),
                sell_up_rate: parse_or("TRADING_SELL_UP_RATE", 10.0),
                sell_down_rate: parse_or("TRADING_SELL_DOWN_RATE", -20.0),
                use_loss_cut: yn("TRADING_SELL_USE_LOSS_CUT", false),
                sell_hold_rate: parse_or("TRADING_SELL_HOLD_RATE", 0.8),
                test_force_sell: yn("TRADING_SELL_TEST_FORCE_SELL", false),
            },
            token_file_path: std::env::var("TOKEN_FILE_PATH")
                .unwrap_or_else(|_| "auth/token.txt".to_string()),
        }
    }
}

fn require(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| panic!("{} not set", key))
}

fn parse_or<T: FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn yn(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v.eq_ignore_ascii_case("y"))
        .unwrap_or(default)
}
