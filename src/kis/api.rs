use serde_json::json;

use super::client::KisClient;
use super::dto::{Body, IndexData, SheetData, TwoArrayData};
use super::error::KisError;
use crate::utils::config::{BrokerConfig, BrokerMode};
use crate::utils::date_utils;
use crate::utils::type_convert::conv_string;

// 期间线图一次最多 100 根，4 段拼出约 400 个交易日
const CHART_EPOCH: i64 = 4;
const CHART_BATCH_DAYS: i64 = 100;

/// 财务报表五类。wire 值 B/I/F/P/E 与券商 TR 一一对应。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Balance,
    Income,
    Ratio,
    Profit,
    Etc,
}

impl SheetKind {
    pub const ALL: [SheetKind; 5] = [
        SheetKind::Balance,
        SheetKind::Income,
        SheetKind::Ratio,
        SheetKind::Profit,
        SheetKind::Etc,
    ];

    #[allow(dead_code)]
    pub fn from_flag(flag: &str) -> Result<Self, KisError> {
        match flag {
            "B" => Ok(SheetKind::Balance),
            "I" => Ok(SheetKind::Income),
            "F" => Ok(SheetKind::Ratio),
            "P" => Ok(SheetKind::Profit),
            "E" => Ok(SheetKind::Etc),
            other => Err(KisError::ArgumentInvalid(format!("unknown sheet flag: {other}"))),
        }
    }

    fn path(self) -> &'static str {
        match self {
            SheetKind::Balance => "/uapi/domestic-stock/v1/finance/balance-sheet",
            SheetKind::Income => "/uapi/domestic-stock/v1/finance/income-statement",
            SheetKind::Ratio => "/uapi/domestic-stock/v1/finance/financial-ratio",
            SheetKind::Profit => "/uapi/domestic-stock/v1/finance/profit-ratio",
            SheetKind::Etc => "/uapi/domestic-stock/v1/finance/other-major-ratios",
        }
    }

    fn tr_id(self) -> &'static str {
        match self {
            SheetKind::Balance => "FHKST66430100",
            SheetKind::Income => "FHKST66430200",
            SheetKind::Ratio => "FHKST66430300",
            SheetKind::Profit => "FHKST66430400",
            SheetKind::Etc => "FHKST66430500",
        }
    }
}

/// 年报/季报周期。wire 值 "0"/"1" 与数据库 sheet_cl 列保持一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetClass {
    Annual,
    Quarter,
}

impl SheetClass {
    pub const ALL: [SheetClass; 2] = [SheetClass::Annual, SheetClass::Quarter];

    pub fn as_code(self) -> &'static str {
        match self {
            SheetClass::Annual => "0",
            SheetClass::Quarter => "1",
        }
    }
}

/// 买/卖方向。wire 值 "B"/"S"。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_code(self) -> &'static str {
        match self {
            OrderSide::Buy => "B",
            OrderSide::Sell => "S",
        }
    }
}

/// 下单成功的结果（rt_cd = "0"），携带券商回传的委托号
#[derive(Debug, Clone)]
pub struct OrderAccepted {
    pub odno: String,
    pub msg1: String,
}

/// KIS REST 的类型化包装层，每个方法对应一个固定 (路径, TR ID)。
#[derive(Clone)]
pub struct KisApi {
    client: KisClient,
    broker: BrokerConfig,
}

impl KisApi {
    pub fn new(client: KisClient, broker: BrokerConfig) -> Self {
        Self { client, broker }
    }

    /// 现价行情 [FHKST01010100]。
    /// 开盘前 stck_oprc 可能为 0，调用方需回退到日别现价。
    pub async fn spot_quote(&self, code: &str) -> Result<Body, KisError> {
        let url = format!(
            "{}/uapi/domestic-stock/v1/quotations/inquire-price",
            self.broker.quote_base()
        );
        let query = format!("?fid_cond_mrkt_div_code=J&fid_input_iscd={code}");
        self.client.get(&url, &query, "FHKST01010100").await
    }

    /// 期间日线 [FHKST03010100]，一次最多返回 100 根
    pub async fn fetch_chart_price(
        &self,
        code: &str,
        from: &str,
        to: &str,
    ) -> Result<IndexData, KisError> {
        let url = format!(
            "{}/uapi/domestic-stock/v1/quotations/inquire-daily-itemchartprice",
            self.broker.quote_base()
        );
        let query = format!(
            "?fid_cond_mrkt_div_code=J&fid_input_iscd={code}\
             &fid_input_date_1={from}&fid_input_date_2={to}\
             &fid_period_div_code=D&fid_org_adj_prc=1"
        );
        self.client.get(&url, &query, "FHKST03010100").await
    }

    /// 日线历史。today_only 时只取当日一根；否则并发取 4 段共约 400 日，
    /// 实际出站节奏仍由客户端闸门串行化。
    pub async fn history_chart(&self, code: &str, today_only: bool) -> Result<Vec<IndexData>, KisError> {
        if today_only {
            let today = date_utils::today_string();
            return Ok(vec![self.fetch_chart_price(code, &today, &today).await?]);
        }

        let mut handles = Vec::new();
        for i in 0..CHART_EPOCH {
            let api = self.clone();
            let code = code.to_string();
            let from = date_utils::day_string((i + 1) * CHART_BATCH_DAYS - 1);
            let to = date_utils::day_string(i * CHART_BATCH_DAYS);
            handles.push(tokio::spawn(async move {
                api.fetch_chart_price(&code, &from, &to).await
            }));
        }

        let mut batches = Vec::with_capacity(CHART_EPOCH as usize);
        for h in handles {
            let batch = h
                .await
                .map_err(|e| KisError::DataMissing(format!("chart task aborted: {e}")))??;
            batches.push(batch);
        }
        Ok(batches)
    }

    /// 财务报表 [FHKST66430100..500]
    pub async fn financial_sheet(
        &self,
        kind: SheetKind,
        code: &str,
        cycle: SheetClass,
    ) -> Result<SheetData, KisError> {
        let url = format!("{}{}", self.broker.quote_base(), kind.path());
        let query = format!(
            "?fid_cond_mrkt_div_code=J&fid_input_iscd={code}&FID_DIV_CLS_CODE={}",
            cycle.as_code()
        );
        self.client.get(&url, &query, kind.tr_id()).await
    }

    /// 日别现价 [FHKST01010400]，未复权，约最近 30 日
    pub async fn daily_price(&self, code: &str) -> Result<SheetData, KisError> {
        let url = format!(
            "{}/uapi/domestic-stock/v1/quotations/inquire-daily-price",
            self.broker.quote_base()
        );
        let query =
            format!("?fid_cond_mrkt_div_code=J&fid_input_iscd={code}&FID_PERIOD_DIV_CODE=D&FID_ORG_ADJ_PRC=0");
        self.client.get(&url, &query, "FHKST01010400").await
    }

    /// 账户余额 [VTTC8434R/TTTC8434R]。
    /// output1 为持仓明细，output2 为账户汇总（预收金等）。
    pub async fn account_balance(&self) -> Result<TwoArrayData, KisError> {
        let url = format!(
            "{}/uapi/domestic-stock/v1/trading/inquire-balance",
            self.broker.trading_base()
        );
        let tr_id = match self.broker.mode {
            BrokerMode::Real => "TTTC8434R",
            BrokerMode::Mock => "VTTC8434R",
        };
        let query = format!(
            "?CANO={}&ACNT_PRDT_CD={}&AFHR_FLPR_YN=N&OFL_YN=&INQR_DVSN=01&UNPR_DVSN=01\
             &FUND_STTL_ICLD_YN=N&FNCG_AMT_AUTO_RDPT_YN=N&PRCS_DVSN=01\
             &CTX_AREA_FK100=&CTX_AREA_NK100=",
            self.broker.account_no, self.broker.account_product
        );
        self.client.get(&url, &query, tr_id).await
    }

    /// 现金买卖下单 [VTTC0012U/VTTC0011U | TTTC0012U/TTTC0011U]。
    /// ORD_DVSN 固定 "00"（限价）。rt_cd != "0" 视为业务拒单。
    pub async fn order_cash(
        &self,
        side: OrderSide,
        code: &str,
        qty: i32,
        price: i32,
    ) -> Result<OrderAccepted, KisError> {
        let url = format!(
            "{}/uapi/domestic-stock/v1/trading/order-cash",
            self.broker.trading_base()
        );
        let tr_id = match (self.broker.mode, side) {
            (BrokerMode::Mock, OrderSide::Buy) => "VTTC0012U",
            (BrokerMode::Mock, OrderSide::Sell) => "VTTC0011U",
            (BrokerMode::Real, OrderSide::Buy) => "TTTC0012U",
            (BrokerMode::Real, OrderSide::Sell) => "TTTC0011U",
        };
        let body = json!({
            "CANO": self.broker.account_no,
            "ACNT_PRDT_CD": "01",
            "PDNO": code,
            "ORD_DVSN": "00",
            "ORD_QTY": qty.to_string(),
            "ORD_UNPR": price.to_string(),
        });

        let resp: Body = self.client.post(&url, body, tr_id).await?;
        if resp.rt_cd != "0" {
            return Err(KisError::BrokerReject {
                rt_cd: resp.rt_cd,
                msg1: resp.msg1,
            });
        }
        let output = resp
            .output
            .ok_or_else(|| KisError::DataMissing(format!("order output missing: {}", resp.msg1)))?;
        Ok(OrderAccepted {
            odno: conv_string(output.get("ODNO")),
            msg1: resp.msg1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_kind_from_flag() {
        assert_eq!(SheetKind::from_flag("B").unwrap(), SheetKind::Balance);
        assert_eq!(SheetKind::from_flag("I").unwrap(), SheetKind::Income);
        assert_eq!(SheetKind::from_flag("F").unwrap(), SheetKind::Ratio);
        assert_eq!(SheetKind::from_flag("P").unwrap(), SheetKind::Profit);
        assert_eq!(SheetKind::from_flag("E").unwrap(), SheetKind::Etc);
        assert!(matches!(
            SheetKind::from_flag("X"),
            Err(KisError::ArgumentInvalid(_))
        ));
    }

    #[test]
    fn test_sheet_kind_tr_ids() {
        assert_eq!(SheetKind::Balance.tr_id(), "FHKST66430100");
        assert_eq!(SheetKind::Etc.tr_id(), "FHKST66430500");
    }

    #[test]
    fn test_wire_codes() {
        assert_eq!(SheetClass::Annual.as_code(), "0");
        assert_eq!(SheetClass::Quarter.as_code(), "1");
        assert_eq!(OrderSide::Buy.as_code(), "B");
        assert_eq!(OrderSide::Sell.as_code(), "S");
    }
}
