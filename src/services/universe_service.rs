use std::collections::HashSet;

use chrono::Utc;
use chrono_tz::Asia::Seoul;
use serde::Deserialize;

use crate::app::DbPool;
use crate::models::NewTicker;
use crate::repositories::ticker;
use crate::utils::config::KrxConfig;
use crate::utils::date_utils;

const MAX_FETCH_RETRIES: usize = 3;
/// 只保留普通股，排除优先股/存托凭证等
const COMMON_STOCK: &str = "보통주";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Market {
    Kospi,
    Kosdaq,
}

impl Market {
    pub fn as_tag(self) -> &'static str {
        match self {
            Market::Kospi => "KOSPI",
            Market::Kosdaq => "KOSDAQ",
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    #[serde(rename = "OutBlock_1", default)]
    rows: Vec<RefRow>,
}

#[derive(Debug, Clone, Deserialize)]
struct RefRow {
    #[serde(rename = "ISU_SRT_CD", default)]
    isu_srt_cd: String,
    #[serde(rename = "ISU_ABBRV", default)]
    isu_abbrv: String,
    #[serde(rename = "ISU_ENG_NM", default)]
    isu_eng_nm: String,
    #[serde(rename = "MKT_TP_NM", default)]
    mkt_tp_nm: String,
    #[serde(rename = "SECT_TP_NM", default)]
    sect_tp_nm: String,
    #[serde(rename = "KIND_STKCERT_TP_NM", default)]
    kind_stkcert_tp_nm: String,
}

#[derive(Debug, Default)]
pub struct UniverseSyncResult {
    pub total_count: usize,
    pub inserted_count: usize,
    pub refreshed_count: usize,
    pub failed_count: usize,
}

/// 按市场同步交易所参考数据：新代码建档，老代码只刷新名称/板块。
pub async fn sync_market(
    db_pool: &DbPool,
    http: &reqwest::Client,
    krx: &KrxConfig,
    market: Market,
) -> anyhow::Result<UniverseSyncResult> {
    let rows = fetch_reference(http, krx, market).await?;
    let filtered = filter_common_stocks(rows);
    tracing::info!("{} 参考数据 {} 只普通股", market.as_tag(), filtered.len());

    let mut conn = db_pool.get()?;
    let mut result = UniverseSyncResult {
        total_count: filtered.len(),
        ..Default::default()
    };

    for row in filtered {
        let code = strip_code_prefix(&row.isu_srt_cd);
        let outcome = if ticker::exists_by_code(&mut conn, code)? {
            ticker::refresh_name_sector(&mut conn, code, &row.isu_abbrv, &row.sect_tp_nm)
                .map(|_| false)
        } else {
            ticker::create(
                &mut conn,
                &NewTicker {
                    item_cd: code.to_string(),
                    mrkt_ctg: row.mkt_tp_nm.clone(),
                    itms_nm: row.isu_abbrv.clone(),
                    corp_nm: row.isu_eng_nm.clone(),
                    sector: row.sect_tp_nm.clone(),
                    created_date: Utc::now().with_timezone(&Seoul).naive_local(),
                },
            )
            .map(|_| true)
        };

        match outcome {
            Ok(true) => result.inserted_count += 1,
            Ok(false) => result.refreshed_count += 1,
            Err(e) => {
                result.failed_count += 1;
                tracing::error!("股票建档失败: {} - {}", code, e);
            }
        }
    }

    tracing::info!(
        "{} 参考数据同步完成, 总计: {}, 新增: {}, 刷新: {}, 失败: {}",
        market.as_tag(),
        result.total_count,
        result.inserted_count,
        result.refreshed_count,
        result.failed_count
    );
    Ok(result)
}

async fn fetch_reference(
    http: &reqwest::Client,
    krx: &KrxConfig,
    market: Market,
) -> anyhow::Result<Vec<RefRow>> {
    let base = match market {
        Market::Kospi => &krx.kospi_url,
        Market::Kosdaq => &krx.kosdaq_url,
    };
    // 参考数据按昨日基准日提供
    let url = format!(
        "{}?AUTH_KEY={}&basDd={}",
        base,
        krx.auth_key,
        date_utils::yesterday_string()
    );

    let mut last_err = None;
    for attempt in 1..=MAX_FETCH_RETRIES {
        match try_fetch(http, &url).await {
            Ok(rows) => return Ok(rows),
            Err(e) => {
                tracing::error!(
                    "交易所参考数据获取失败 (第 {} 次): {}",
                    attempt,
                    e
                );
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("reference fetch failed")))
}

async fn try_fetch(http: &reqwest::Client, url: &str) -> anyhow::Result<Vec<RefRow>> {
    let resp = http.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("http status {}", status.as_u16());
    }
    let body: RefResponse = resp.json().await?;
    Ok(body.rows)
}

/// 只留普通股，并按代码先到先得去重
fn filter_common_stocks(rows: Vec<RefRow>) -> Vec<RefRow> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| row.kind_stkcert_tp_nm == COMMON_STOCK)
        .filter(|row| seen.insert(row.isu_srt_cd.clone()))
        .collect()
}

/// 短代码偶尔带 "A" 前缀，去掉后才是 6 位标准代码
fn strip_code_prefix(code: &str) -> &str {
    code.strip_prefix('A').unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, kind: &str) -> RefRow {
        RefRow {
            isu_srt_cd: code.to_string(),
            isu_abbrv: format!("종목{code}"),
            isu_eng_nm: format!("Corp {code}"),
            mkt_tp_nm: "KOSPI".to_string(),
            sect_tp_nm: "제조".to_string(),
            kind_stkcert_tp_nm: kind.to_string(),
        }
    }

    #[test]
    fn test_filter_keeps_common_stock_only() {
        let rows = vec![
            row("005930", COMMON_STOCK),
            row("005935", "우선주"),
            row("035720", COMMON_STOCK),
        ];
        let filtered = filter_common_stocks(rows);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.kind_stkcert_tp_nm == COMMON_STOCK));
    }

    #[test]
    fn test_filter_dedupes_first_wins() {
        let mut first = row("005930", COMMON_STOCK);
        first.isu_abbrv = "첫번째".to_string();
        let mut second = row("005930", COMMON_STOCK);
        second.isu_abbrv = "두번째".to_string();

        let filtered = filter_common_stocks(vec![first, second]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].isu_abbrv, "첫번째");
    }

    #[test]
    fn test_strip_code_prefix() {
        assert_eq!(strip_code_prefix("A005930"), "005930");
        assert_eq!(strip_code_prefix("005930"), "005930");
        // only a leading A is a prefix
        assert_eq!(strip_code_prefix("00A930"), "00A930");
    }

    #[test]
    fn test_ref_response_parsing() {
        let json = r#"{"OutBlock_1":[
            {"ISU_SRT_CD":"A005930","ISU_ABBRV":"삼성전자","ISU_ENG_NM":"SamsungElec",
             "MKT_TP_NM":"KOSPI","SECT_TP_NM":"전기전자","KIND_STKCERT_TP_NM":"보통주"}
        ]}"#;
        let parsed: RefResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].isu_srt_cd, "A005930");
    }
}
