use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;

use crate::app::AppContext;
use crate::kis::api::{SheetClass, SheetKind};
use crate::kis::dto::OutputMap;
use crate::models::{
    NewBalanceSheet, NewEquitySnapshot, NewEtcSheet, NewIncomeSheet, NewPriceBar, NewProfitSheet,
    NewRatioSheet,
};
use crate::repositories::{equity_snapshot, price_bar, sheet, ticker};
use crate::services::{ma_service, universe_service::Market};
use crate::utils::date_utils;
use crate::utils::type_convert::{conv_bigdecimal, conv_i32, conv_i64, conv_string};

/// 单市场采集的并发工作数
const WORKER_POOL_SIZE: usize = 4;
/// 软截止：超时后在途任务跑完，不再派发新股票
const SOFT_DEADLINE: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Default)]
pub struct IngestResult {
    pub total_count: usize,
    pub success_count: usize,
    pub failed_count: usize,
}

/// 按市场批量采集：日线历史 + 基本面快照 + 财务报表 + 均线。
/// 每只股票一个工作单元丢进有界工作池，单只失败只记日志。
pub async fn ingest_market(ctx: &AppContext, market: Market) -> anyhow::Result<IngestResult> {
    let codes = {
        let mut conn = ctx.db_pool.get()?;
        ticker::list_codes_by_market(&mut conn, market.as_tag())?
    };
    tracing::info!("{} 采集开始, 共 {} 只", market.as_tag(), codes.len());

    let deadline = Instant::now() + SOFT_DEADLINE;
    let semaphore = Arc::new(Semaphore::new(WORKER_POOL_SIZE));
    let mut handles = Vec::with_capacity(codes.len());
    let mut admitted = 0usize;

    for code in &codes {
        if Instant::now() >= deadline {
            tracing::warn!(
                "{} 采集超过软截止时间, 剩余 {} 只下次再跑",
                market.as_tag(),
                codes.len() - admitted
            );
            break;
        }
        admitted += 1;

        let permit = semaphore.clone().acquire_owned().await?;
        let ctx = ctx.clone();
        let code = code.clone();
        handles.push(tokio::spawn(async move {
            let _permit = permit;
            let outcome = ingest_item(&ctx, &code).await;
            (code, outcome)
        }));
    }

    let mut result = IngestResult {
        total_count: admitted,
        ..Default::default()
    };
    for handle in handles {
        match handle.await {
            Ok((_, Ok(()))) => result.success_count += 1,
            Ok((code, Err(e))) => {
                result.failed_count += 1;
                tracing::error!("采集失败: {} - {}", code, e);
            }
            Err(e) => {
                result.failed_count += 1;
                tracing::error!("采集任务中止: {}", e);
            }
        }
    }

    tracing::info!(
        "{} 采集完成, 总计: {}, 成功: {}, 失败: {}",
        market.as_tag(),
        result.total_count,
        result.success_count,
        result.failed_count
    );
    Ok(result)
}

/// 单只股票的采集单元。
/// 首次见到的股票拉全量历史（约 400 日），老股票只补当日；
/// 当日已齐的直接跳过。快照与十张报表并发拉取，最后重算均线。
async fn ingest_item(ctx: &AppContext, code: &str) -> anyhow::Result<()> {
    let today = date_utils::today_string();

    let (need_fetch, today_only) = {
        let mut conn = ctx.db_pool.get()?;
        if price_bar::find_latest(&mut conn, code)?.is_some() {
            let missing_today = price_bar::find_by_key(&mut conn, code, &today)?.is_none();
            (missing_today, true)
        } else {
            (true, false)
        }
    };
    if !need_fetch {
        tracing::debug!("当日数据已齐: {}", code);
        return Ok(());
    }

    // 日线先落库，均线和枢轴都依赖它
    let charts = ctx.kis.history_chart(code, today_only).await?;
    {
        let mut conn = ctx.db_pool.get()?;
        for chart in &charts {
            let Some(rows) = chart.output2.as_ref() else {
                continue;
            };
            for row in rows {
                if let Some(bar) = price_bar_from_output(code, row) {
                    price_bar::upsert(&mut conn, &bar)?;
                }
            }
        }
    }

    // 基本面快照 + 5 类报表 × 年/季，共 11 个调用并发派发，
    // 实际节奏由客户端闸门限到 1 rps
    let mut handles = Vec::new();
    {
        let ctx = ctx.clone();
        let code = code.to_string();
        handles.push(tokio::spawn(async move { ingest_snapshot(&ctx, &code).await }));
    }
    for kind in SheetKind::ALL {
        for cycle in SheetClass::ALL {
            let ctx = ctx.clone();
            let code = code.to_string();
            handles.push(tokio::spawn(async move {
                ingest_sheet(&ctx, kind, &code, cycle).await
            }));
        }
    }
    for handle in handles {
        handle
            .await
            .map_err(|e| anyhow::anyhow!("ingest task aborted: {e}"))??;
    }

    let mut conn = ctx.db_pool.get()?;
    ma_service::refresh_for_item(&mut conn, code)?;
    Ok(())
}

async fn ingest_snapshot(ctx: &AppContext, code: &str) -> anyhow::Result<()> {
    let body = ctx.kis.spot_quote(code).await?;
    let Some(output) = body.output.as_ref() else {
        anyhow::bail!("spot quote output missing: {code}");
    };

    let snapshot = snapshot_from_output(code, output);
    let mut conn = ctx.db_pool.get()?;
    equity_snapshot::upsert(&mut conn, &snapshot)?;
    Ok(())
}

async fn ingest_sheet(
    ctx: &AppContext,
    kind: SheetKind,
    code: &str,
    cycle: SheetClass,
) -> anyhow::Result<()> {
    let data = ctx.kis.financial_sheet(kind, code, cycle).await?;
    let Some(rows) = data.output.as_ref() else {
        return Ok(());
    };

    let mut conn = ctx.db_pool.get()?;
    for row in rows {
        let yymm = conv_string(row.get("stac_yymm"));
        if yymm.is_empty() {
            continue;
        }
        let cl = cycle.as_code().to_string();
        match kind {
            SheetKind::Balance => {
                sheet::upsert_balance(
                    &mut conn,
                    &NewBalanceSheet {
                        item_cd: code.to_string(),
                        sheet_cl: cl,
                        stac_yymm: yymm,
                        cras: conv_bigdecimal(row.get("cras")),
                        fxas: conv_bigdecimal(row.get("fxas")),
                        total_aset: conv_bigdecimal(row.get("total_aset")),
                        flow_lblt: conv_bigdecimal(row.get("flow_lblt")),
                        fix_lblt: conv_bigdecimal(row.get("fix_lblt")),
                        total_lblt: conv_bigdecimal(row.get("total_lblt")),
                        cpfn: conv_bigdecimal(row.get("cpfn")),
                        cfp_surp: conv_bigdecimal(row.get("cfp_surp")),
                        prfi_surp: conv_bigdecimal(row.get("prfi_surp")),
                        total_cptl: conv_bigdecimal(row.get("total_cptl")),
                    },
                )?;
            }
            SheetKind::Income => {
                sheet::upsert_income(
                    &mut conn,
                    &NewIncomeSheet {
                        item_cd: code.to_string(),
                        sheet_cl: cl,
                        stac_yymm: yymm,
                        sale_account: conv_bigdecimal(row.get("sale_account")),
                        sale_cost: conv_bigdecimal(row.get("sale_cost")),
                        sale_totl_prfi: conv_bigdecimal(row.get("sale_totl_prfi")),
                        depr_cost: conv_bigdecimal(row.get("depr_cost")),
                        sell_mang: conv_bigdecimal(row.get("sell_mang")),
                        bsop_prti: conv_bigdecimal(row.get("bsop_prti")),
                        bsop_non_ernn: conv_bigdecimal(row.get("bsop_non_ernn")),
                        bsop_non_expn: conv_bigdecimal(row.get("bsop_non_expn")),
                        op_prfi: conv_bigdecimal(row.get("op_prfi")),
                        spec_prfi: conv_bigdecimal(row.get("spec_prfi")),
                        spec_loss: conv_bigdecimal(row.get("spec_loss")),
                        thtr_ntin: conv_bigdecimal(row.get("thtr_ntin")),
                    },
                )?;
            }
            SheetKind::Ratio => {
                sheet::upsert_ratio(
                    &mut conn,
                    &NewRatioSheet {
                        item_cd: code.to_string(),
                        sheet_cl: cl,
                        stac_yymm: yymm,
                        grs: conv_bigdecimal(row.get("grs")),
                        bsop_prfi_inrt: conv_bigdecimal(row.get("bsop_prfi_inrt")),
                        ntin_inrt: conv_bigdecimal(row.get("ntin_inrt")),
                        roe_val: conv_bigdecimal(row.get("roe_val")),
                        eps: conv_bigdecimal(row.get("eps")),
                        sps: conv_bigdecimal(row.get("sps")),
                        bps: conv_bigdecimal(row.get("bps")),
                        rsrv_rate: conv_bigdecimal(row.get("rsrv_rate")),
                        lblt_rate: conv_bigdecimal(row.get("lblt_rate")),
                    },
                )?;
            }
            SheetKind::Profit => {
                sheet::upsert_profit(
                    &mut conn,
                    &NewProfitSheet {
                        item_cd: code.to_string(),
                        sheet_cl: cl,
                        stac_yymm: yymm,
                        cptl_ntin_rate: conv_bigdecimal(row.get("cptl_ntin_rate")),
                        self_cptl_ntin_inrt: conv_bigdecimal(row.get("self_cptl_ntin_inrt")),
                        sale_ntin_rate: conv_bigdecimal(row.get("sale_ntin_rate")),
                        sale_totl_rate: conv_bigdecimal(row.get("sale_totl_rate")),
                    },
                )?;
            }
            SheetKind::Etc => {
                sheet::upsert_etc(
                    &mut conn,
                    &NewEtcSheet {
                        item_cd: code.to_string(),
                        sheet_cl: cl,
                        stac_yymm: yymm,
                        payout_rate: conv_bigdecimal(row.get("payout_rate")),
                        eva: conv_bigdecimal(row.get("eva")),
                        ebitda: conv_bigdecimal(row.get("ebitda")),
                        ev_ebitda: conv_bigdecimal(row.get("ev_ebitda")),
                    },
                )?;
            }
        }
    }
    Ok(())
}

fn price_bar_from_output(code: &str, row: &OutputMap) -> Option<NewPriceBar> {
    let date = conv_string(row.get("stck_bsop_date"));
    if date.is_empty() || date == "null" {
        return None;
    }
    Some(NewPriceBar {
        item_cd: code.to_string(),
        stck_bsop_date: date,
        stck_clpr: conv_i32(row.get("stck_clpr")),
        stck_oprc: conv_i32(row.get("stck_oprc")),
        stck_hgpr: conv_i32(row.get("stck_hgpr")),
        stck_lwpr: conv_i32(row.get("stck_lwpr")),
        acml_vol: conv_i64(row.get("acml_vol")),
        acml_tr_pbmn: conv_bigdecimal(row.get("acml_tr_pbmn")),
        prdy_vrss: conv_i32(row.get("prdy_vrss")),
        prdy_vrss_sign: conv_i32(row.get("prdy_vrss_sign")),
    })
}

fn snapshot_from_output(code: &str, output: &OutputMap) -> NewEquitySnapshot {
    NewEquitySnapshot {
        item_cd: code.to_string(),
        bstp_kor_isnm: conv_string(output.get("bstp_kor_isnm")),
        iscd_stat_cls_code: conv_string(output.get("iscd_stat_cls_code")),
        stck_sdpr: conv_bigdecimal(output.get("stck_sdpr")),
        wghn_avrg_stck_prc: conv_bigdecimal(output.get("wghn_avrg_stck_prc")),
        stck_fcam: conv_bigdecimal(output.get("stck_fcam")),
        stck_mxpr: conv_bigdecimal(output.get("stck_mxpr")),
        stck_llam: conv_bigdecimal(output.get("stck_llam")),
        lstn_stcn: conv_bigdecimal(output.get("lstn_stcn")),
        hts_avls: conv_bigdecimal(output.get("hts_avls")),
        vol_tnrt: conv_bigdecimal(output.get("vol_tnrt")),
        frgn_hldn_qty: conv_bigdecimal(output.get("frgn_hldn_qty")),
        frgn_ntby_qty: conv_bigdecimal(output.get("frgn_ntby_qty")),
        pgtr_ntby_qty: conv_bigdecimal(output.get("pgtr_ntby_qty")),
        w52_hgpr: conv_bigdecimal(output.get("w52_hgpr")),
        w52_hgpr_date: conv_string(output.get("w52_hgpr_date")),
        w52_hgpr_vrss_prpr_ctrt: conv_bigdecimal(output.get("w52_hgpr_vrss_prpr_ctrt")),
        w52_lwpr: conv_bigdecimal(output.get("w52_lwpr")),
        w52_lwpr_date: conv_string(output.get("w52_lwpr_date")),
        w52_lwpr_vrss_prpr_ctrt: conv_bigdecimal(output.get("w52_lwpr_vrss_prpr_ctrt")),
        stck_dryy_hgpr: conv_bigdecimal(output.get("stck_dryy_hgpr")),
        dryy_hgpr_date: conv_string(output.get("dryy_hgpr_date")),
        dryy_hgpr_vrss_prpr_rate: conv_bigdecimal(output.get("dryy_hgpr_vrss_prpr_rate")),
        stck_dryy_lwpr: conv_bigdecimal(output.get("stck_dryy_lwpr")),
        dryy_lwpr_date: conv_string(output.get("dryy_lwpr_date")),
        dryy_lwpr_vrss_prpr_rate: conv_bigdecimal(output.get("dryy_lwpr_vrss_prpr_rate")),
        d250_hgpr: conv_bigdecimal(output.get("d250_hgpr")),
        d250_hgpr_date: conv_string(output.get("d250_hgpr_date")),
        d250_hgpr_vrss_prpr_rate: conv_bigdecimal(output.get("d250_hgpr_vrss_prpr_rate")),
        d250_lwpr: conv_bigdecimal(output.get("d250_lwpr")),
        d250_lwpr_date: conv_string(output.get("d250_lwpr_date")),
        d250_lwpr_vrss_prpr_rate: conv_bigdecimal(output.get("d250_lwpr_vrss_prpr_rate")),
        per: conv_bigdecimal(output.get("per")),
        eps: conv_bigdecimal(output.get("eps")),
        pbr: conv_bigdecimal(output.get("pbr")),
        bps: conv_bigdecimal(output.get("bps")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn output_map(pairs: &[(&str, serde_json::Value)]) -> OutputMap {
        let mut map = Map::new();
        for (k, v) in pairs {
            map.insert(k.to_string(), v.clone());
        }
        map
    }

    #[test]
    fn test_price_bar_from_output() {
        let row = output_map(&[
            ("stck_bsop_date", json!("20250731")),
            ("stck_clpr", json!("9000")),
            ("stck_oprc", json!("8900")),
            ("stck_hgpr", json!("9100")),
            ("stck_lwpr", json!("8850")),
            ("acml_vol", json!("12345678")),
            ("acml_tr_pbmn", json!("111058102200")),
            ("prdy_vrss", json!("-100")),
            ("prdy_vrss_sign", json!("5")),
        ]);
        let bar = price_bar_from_output("005930", &row).unwrap();
        assert_eq!(bar.stck_bsop_date, "20250731");
        assert_eq!(bar.stck_clpr, 9000);
        assert_eq!(bar.acml_vol, 12_345_678);
        assert_eq!(bar.prdy_vrss, -100);
    }

    #[test]
    fn test_price_bar_requires_session_date() {
        let row = output_map(&[("stck_clpr", json!("9000"))]);
        assert!(price_bar_from_output("005930", &row).is_none());
    }

    #[test]
    fn test_snapshot_tolerates_dirty_fields() {
        let output = output_map(&[
            ("bstp_kor_isnm", json!("전기전자")),
            ("lstn_stcn", json!("5,000,000")),
            ("per", json!("n/a")),
        ]);
        let snap = snapshot_from_output("005930", &output);
        assert_eq!(snap.bstp_kor_isnm, "전기전자");
        assert_eq!(snap.lstn_stcn, bigdecimal::BigDecimal::from(5_000_000));
        assert_eq!(snap.per, bigdecimal::BigDecimal::from(0));
    }
}
