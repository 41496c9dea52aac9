//! HTTP dashboard and JSON API
//!
//! Routes:
//! - `GET /` dashboard (form plus tabs once a code is submitted)
//! - `GET /api/analyze?code=&years=` full [`AnalysisReport`](crate::engine::AnalysisReport) as JSON
//! - `GET /api/report?code=&years=` Excel download
//! - `GET /healthz` liveness check

pub mod handlers;
pub mod view;

use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, HttpServer, ResponseError, web};
use minijinja::Environment;
use serde_json::json;
use tracing::info;

use crate::config::InsightConfig;
use crate::engine::AnalysisEngine;
use crate::error::{InsightError, Result};

pub use handlers::{analyze, excel_report, healthz, index};

/// Shared state handed to every handler
pub struct AppState {
    pub engine: AnalysisEngine,
    templates: Environment<'static>,
}

impl AppState {
    pub fn new(engine: AnalysisEngine) -> Result<Self> {
        Ok(Self {
            engine,
            templates: view::templates()?,
        })
    }

    pub(crate) fn render_dashboard(&self, dashboard: &view::DashboardView) -> Result<String> {
        Ok(self
            .templates
            .get_template(view::DASHBOARD_TEMPLATE)?
            .render(dashboard)?)
    }
}

/// Register all routes on an app or test service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(analyze)
        .service(excel_report)
        .service(healthz);
}

/// Serve the dashboard until the process is stopped
pub async fn run(config: InsightConfig) -> std::io::Result<()> {
    let address = config.bind_address();
    let engine = AnalysisEngine::new(&config);
    let state = AppState::new(engine).map_err(std::io::Error::other)?;
    let data = web::Data::new(state);

    info!(%address, "starting stock insight server");

    HttpServer::new(move || App::new().app_data(data.clone()).configure(configure))
        .bind((config.host.clone(), config.port))?
        .run()
        .await
}

impl ResponseError for InsightError {
    fn status_code(&self) -> StatusCode {
        match self {
            InsightError::InvalidSymbol(_) | InsightError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            InsightError::DataUnavailable { .. } => StatusCode::NOT_FOUND,
            InsightError::RateLimitExceeded { .. }
            | InsightError::ApiError { .. }
            | InsightError::NetworkError(_)
            | InsightError::YahooFinanceError(_) => StatusCode::BAD_GATEWAY,
            InsightError::JsonError(_)
            | InsightError::ReportError(_)
            | InsightError::TemplateError(_)
            | InsightError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            InsightError::InvalidSymbol("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            InsightError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            InsightError::DataUnavailable {
                symbol: "X".into(),
                reason: "none".into()
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            InsightError::RateLimitExceeded {
                provider: "p".into()
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            InsightError::ConfigError("bad".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_dashboard_template_loads() {
        assert!(view::templates().is_ok());
    }
}
