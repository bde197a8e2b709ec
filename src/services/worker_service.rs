use crate::app::AppContext;
use crate::kis::api::{KisApi, OrderSide};
use crate::kis::error::KisError;
use crate::models::{NewTradeHistory, NewTradeStatus, PossibilityUpdate, TradeDirection};
use crate::repositories::{ticker, trade_history, trade_info, trade_status};
use crate::utils::date_utils;
use crate::utils::type_convert::{conv_f64, conv_i32, conv_i64, conv_string};

pub const STRATEGY_SWING: &str = "SW";

#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentPriceInfo {
    pub stck_oprc: i32,
    pub stck_hgpr: i32,
    pub stck_lwpr: i32,
    pub stck_prpr: i32,
}

/// 可用资金：有预收金（prvs_rcdl_excc_amt）用预收金，否则用预托金总额
pub async fn effective_cash(api: &KisApi) -> Result<i64, KisError> {
    let balance = api.account_balance().await?;
    let Some(output2) = balance.output2.as_ref().and_then(|rows| rows.first()) else {
        return Ok(0);
    };

    let prvs_rcdl = conv_i64(output2.get("prvs_rcdl_excc_amt"));
    if prvs_rcdl > 0 {
        Ok(prvs_rcdl)
    } else {
        Ok(conv_i64(output2.get("dnca_tot_amt")))
    }
}

/// 现价四件套。开盘前行情里 stck_oprc 偶尔是 0，回退到日别现价最近一行。
pub async fn current_price_info(api: &KisApi, code: &str) -> Result<CurrentPriceInfo, KisError> {
    let body = api.spot_quote(code).await?;
    let Some(output) = body.output.as_ref() else {
        return Ok(CurrentPriceInfo::default());
    };

    let mut oprc = conv_i32(output.get("stck_oprc"));
    if oprc == 0 {
        oprc = fallback_open_price(api, code).await?;
    }

    Ok(CurrentPriceInfo {
        stck_oprc: oprc,
        stck_hgpr: conv_i32(output.get("stck_hgpr")),
        stck_lwpr: conv_i32(output.get("stck_lwpr")),
        stck_prpr: conv_i32(output.get("stck_prpr")),
    })
}

async fn fallback_open_price(api: &KisApi, code: &str) -> Result<i32, KisError> {
    let daily = api.daily_price(code).await?;
    Ok(daily
        .output
        .as_ref()
        .and_then(|rows| rows.first())
        .map(|row| conv_i32(row.get("stck_oprc")))
        .unwrap_or(0))
}

/// 把券商账户的实际持仓同步回本地状态（现行化）。
/// output1 的每一行对应一只持仓股。
pub async fn reconcile_holdings(ctx: &AppContext, date: &str, limit_price: i64) -> anyhow::Result<()> {
    let balance = ctx.kis.account_balance().await?;
    let Some(rows) = balance.output1 else {
        return Ok(());
    };

    let mut conn = ctx.db_pool.get()?;
    for row in &rows {
        let pdno = conv_string(row.get("pdno"));
        if pdno.is_empty() {
            continue;
        }
        let pdnm = conv_string(row.get("prdt_name"));
        let pchs_amt = conv_f64(row.get("pchs_amt"));
        let bought_price = conv_f64(row.get("pchs_avg_pric"));
        let bought_count = conv_f64(row.get("hldg_qty"));

        // 当日已标记卖出的股票即便还留在余额里（成交后的短暂滞留）也跳过
        if let Some(status) = trade_status::find_by_key(&mut conn, &pdno, date)? {
            if TradeDirection::from_code(&status.trade_type) == Some(TradeDirection::SoldStop) {
                tracing::debug!("跳过已卖出持仓: {}", pdno);
                continue;
            }
        }

        if pchs_amt > 0.0 {
            trade_status::upsert(
                &mut conn,
                &NewTradeStatus {
                    item_cd: pdno.clone(),
                    trade_date: date.to_string(),
                    trade_type: TradeDirection::BoughtStop.as_code().to_string(),
                    odno: String::new(),
                    qty: bought_count as i32,
                    trade_price: bought_price as i32,
                    trade_time: date_utils::time_string(),
                },
            )?;

            // 持仓市值超过单股限额就禁买（buy-stop）
            let total_value = bought_count * bought_price;
            let (possibility, remark) = if total_value > limit_price as f64 {
                ("N", "swing bought item(buy-stop)")
            } else {
                ("Y", "swing bought item")
            };
            trade_info::upsert_possibility(
                &mut conn,
                &pdno,
                date,
                &PossibilityUpdate {
                    yn_possibility: possibility.to_string(),
                    cd_type: Some(STRATEGY_SWING.to_string()),
                    rmk: remark.to_string(),
                },
            )?;

            tracing::info!("持仓现行化: {} ({})", pdno, pdnm);
        } else {
            // 余额里有行但买入金额为 0（已清仓等）
            trade_status::upsert(
                &mut conn,
                &NewTradeStatus {
                    item_cd: pdno.clone(),
                    trade_date: date.to_string(),
                    trade_type: TradeDirection::SoldStop.as_code().to_string(),
                    odno: String::new(),
                    qty: bought_count as i32,
                    trade_price: bought_price as i32,
                    trade_time: date_utils::time_string(),
                },
            )?;
        }
    }
    Ok(())
}

/// 下限价单并做成功后的记账：状态行、历史行、通知。
/// 券商拒单（rt_cd != "0"）只记日志，状态与历史都不动。
/// 返回是否成交提交成功。
pub async fn submit_order(
    ctx: &AppContext,
    code: &str,
    qty: i32,
    price: i32,
    side: OrderSide,
) -> anyhow::Result<bool> {
    let accepted = match ctx.kis.order_cash(side, code, qty, price).await {
        Ok(accepted) => accepted,
        Err(KisError::BrokerReject { rt_cd, msg1 }) => {
            tracing::warn!(
                "下单被拒: {} side={} rt_cd={} msg1={}",
                code,
                side.as_code(),
                rt_cd,
                msg1
            );
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(
        "下单成功: {} side={} odno={} msg1={}",
        code,
        side.as_code(),
        accepted.odno,
        accepted.msg1
    );

    let date = date_utils::today_string();
    let (target_status, history_type, action) = match side {
        OrderSide::Buy => (TradeDirection::BoughtStop, "B", "buy"),
        OrderSide::Sell => (TradeDirection::SoldStop, "SS", "sell"),
    };

    let mut conn = ctx.db_pool.get()?;
    let item_name = ticker::find_by_code(&mut conn, code)?
        .map(|t| t.itms_nm)
        .unwrap_or_else(|| code.to_string());

    trade_status::upsert(
        &mut conn,
        &NewTradeStatus {
            item_cd: code.to_string(),
            trade_date: date.clone(),
            trade_type: target_status.as_code().to_string(),
            odno: accepted.odno.clone(),
            qty,
            trade_price: price,
            trade_time: date_utils::time_string(),
        },
    )?;

    let message = format!(
        "[swing-{action}] {item_name} ({code}-{STRATEGY_SWING}) qty={qty} price={price} odno={}",
        accepted.odno
    );
    trade_history::append(
        &mut conn,
        &NewTradeHistory {
            item_cd: code.to_string(),
            trade_date: date,
            trade_hour: date_utils::time_string(),
            trade_type: history_type.to_string(),
            trade_count: qty,
            trade_price: price,
            rmk: message.clone(),
        },
    )?;

    ctx.notifier.send(&message).await;
    Ok(true)
}
