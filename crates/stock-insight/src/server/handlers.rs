//! Route handlers

use actix_web::http::StatusCode;
use actix_web::http::header::{ContentDisposition, ContentType};
use actix_web::{HttpResponse, ResponseError, get, web};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::AppState;
use super::view::DashboardView;
use crate::engine::AnalysisReport;
use crate::error::{InsightError, Result};
use crate::report::{ExcelReport, XLSX_MIME};

pub const DEFAULT_CODE: &str = "600519";
pub const DEFAULT_YEARS: u32 = 1;

/// `?code=&years=` as submitted by the dashboard form
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeQuery {
    pub code: Option<String>,
    pub years: Option<String>,
}

impl AnalyzeQuery {
    /// Parsed `years`; range checks happen in the engine
    fn years(&self) -> Result<u32> {
        match self.years.as_deref().map(str::trim).filter(|y| !y.is_empty()) {
            None => Ok(DEFAULT_YEARS),
            Some(raw) => raw.parse().map_err(|_| {
                InsightError::InvalidInput(format!("years must be a whole number, got `{raw}`"))
            }),
        }
    }

    fn code(&self) -> Option<&str> {
        self.code.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    fn require_code(&self) -> Result<&str> {
        self.code()
            .ok_or_else(|| InsightError::InvalidInput("missing query parameter `code`".to_string()))
    }
}

#[get("/")]
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<AnalyzeQuery>,
) -> Result<HttpResponse> {
    let code = query.code().unwrap_or(DEFAULT_CODE);
    let (mut dashboard, mut status) = match query.years() {
        Ok(years) => (DashboardView::new(code, years), StatusCode::OK),
        Err(e) => (
            DashboardView::new(code, DEFAULT_YEARS).with_error(e.to_string()),
            e.status_code(),
        ),
    };

    if let (Some(code), Ok(years)) = (query.code(), query.years()) {
        match state.engine.analyze(code, years).await {
            Ok(analysis) => dashboard = dashboard.with_report(&analysis),
            Err(e) => {
                warn!(code, years, error = %e, "dashboard analysis failed");
                status = e.status_code();
                dashboard = dashboard.with_error(e.to_string());
            }
        }
    }

    let html = state.render_dashboard(&dashboard)?;
    Ok(HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(html))
}

#[get("/api/analyze")]
pub async fn analyze(
    state: web::Data<AppState>,
    query: web::Query<AnalyzeQuery>,
) -> Result<web::Json<AnalysisReport>> {
    let code = query.require_code()?;
    let analysis = state.engine.analyze(code, query.years()?).await?;
    info!(symbol = %analysis.symbol, warnings = analysis.warnings.len(), "served analysis");
    Ok(web::Json(analysis))
}

#[get("/api/report")]
pub async fn excel_report(
    state: web::Data<AppState>,
    query: web::Query<AnalyzeQuery>,
) -> Result<HttpResponse> {
    let code = query.require_code()?;
    let analysis = state.engine.analyze(code, query.years()?).await?;
    let bytes = ExcelReport::build(&analysis)?;
    let file_name = analysis.report_file_name();

    info!(symbol = %analysis.symbol, bytes = bytes.len(), file_name = %file_name, "served excel report");
    Ok(HttpResponse::Ok()
        .content_type(XLSX_MIME)
        .insert_header(ContentDisposition::attachment(file_name))
        .body(bytes))
}

#[get("/healthz")]
pub async fn healthz() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
