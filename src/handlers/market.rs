//! 市场广度接口
//!
//! - GET /market/daily/{date} - 获取某日已保存的分析记录
//! - GET /market/summary?days=N - 获取近 N 个有效交易日的摘要
//! - POST /market/analysis?date=YYYYMMDD - 运行当日分析并保存、导出，只接受今日

use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;

use super::AppState;
use crate::models::{ApiResponse, HistoricalSummaryEntry, StoredDailyRecord, SummaryQuery};
use crate::services::analyzer::{resolve_analysis_date, DailyRunOutcome};
use crate::services::history::build_summary;
use crate::services::provider::MarketDataProvider;
use crate::services::time::{beijing_today, parse_date_key};

/// 分析请求参数
#[derive(Debug, Deserialize)]
pub struct AnalysisQuery {
    /// 交易日（YYYYMMDD），只能是北京时间今日，默认今日
    pub date: Option<String>,
}

pub async fn get_daily<P: MarketDataProvider>(
    state: web::Data<AppState<P>>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let date = match parse_date_key(&path.into_inner()) {
        Ok(date) => date,
        Err(e) => {
            let response = ApiResponse::<StoredDailyRecord>::error(e.to_string());
            return Ok(HttpResponse::BadRequest().json(response));
        }
    };

    match state.store.load(date) {
        Ok(Some(record)) => Ok(HttpResponse::Ok().json(ApiResponse::success(record))),
        Ok(None) => {
            let response = ApiResponse::<StoredDailyRecord>::error("该日期没有分析记录");
            Ok(HttpResponse::NotFound().json(response))
        }
        Err(e) => {
            let response = ApiResponse::<StoredDailyRecord>::error(e.to_string());
            Ok(HttpResponse::InternalServerError().json(response))
        }
    }
}

pub async fn get_summary<P: MarketDataProvider>(
    state: web::Data<AppState<P>>,
    query: web::Query<SummaryQuery>,
) -> Result<HttpResponse> {
    let days = query.days.unwrap_or(state.summary_days);
    if days == 0 {
        let response = ApiResponse::<Vec<HistoricalSummaryEntry>>::error("days 必须大于 0");
        return Ok(HttpResponse::BadRequest().json(response));
    }

    let summary = build_summary(&state.store, beijing_today(), days, None);
    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}

pub async fn run_analysis<P: MarketDataProvider>(
    state: web::Data<AppState<P>>,
    query: web::Query<AnalysisQuery>,
) -> Result<HttpResponse> {
    let date = match resolve_analysis_date(query.date.as_deref(), beijing_today()) {
        Ok(date) => date,
        Err(e) => {
            let response = ApiResponse::<DailyRunOutcome>::error(e.to_string());
            return Ok(HttpResponse::BadRequest().json(response));
        }
    };

    let outcome = state.analyzer.run_daily(date, &state.store, &state.exporter).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

pub fn config<P: MarketDataProvider + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/market")
            .route("/daily/{date}", web::get().to(get_daily::<P>))
            .route("/summary", web::get().to(get_summary::<P>))
            .route("/analysis", web::post().to(run_analysis::<P>)),
    );
}
