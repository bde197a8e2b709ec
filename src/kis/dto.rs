use serde::Deserialize;
use serde_json::{Map, Value};

// KIS 响应的四种信封。顶层固定为 { rt_cd, msg1, output | output1 | output2 }，
// 负载字段类型松散（数字经常以字符串返回），统一用 Value 承接后走 type_convert。

pub type OutputMap = Map<String, Value>;

/// 单对象负载：现价行情、下单结果
#[derive(Debug, Clone, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub rt_cd: String,
    #[serde(default)]
    pub msg1: String,
    #[serde(default)]
    pub output: Option<OutputMap>,
}

/// 行数组负载：财务报表、日别现价
#[derive(Debug, Clone, Deserialize)]
pub struct SheetData {
    #[serde(default)]
    pub rt_cd: String,
    #[serde(default)]
    pub msg1: String,
    #[serde(default)]
    pub output: Option<Vec<OutputMap>>,
}

/// 期间线图负载：output1 为汇总，output2 为日线数组
#[derive(Debug, Clone, Deserialize)]
pub struct IndexData {
    #[serde(default)]
    pub rt_cd: String,
    #[serde(default)]
    pub msg1: String,
    #[serde(default)]
    pub output1: Option<OutputMap>,
    #[serde(default)]
    pub output2: Option<Vec<OutputMap>>,
}

/// 双数组负载：账户余额（output1 持仓明细，output2 账户汇总）
#[derive(Debug, Clone, Deserialize)]
pub struct TwoArrayData {
    #[serde(default)]
    pub rt_cd: String,
    #[serde(default)]
    pub msg1: String,
    #[serde(default)]
    pub output1: Option<Vec<OutputMap>>,
    #[serde(default)]
    pub output2: Option<Vec<OutputMap>>,
}
