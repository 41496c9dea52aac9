//! HTTP routes served over simulated data

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use std::sync::Arc;
use stock_insight::api::SimulatedSource;
use stock_insight::report::XLSX_MIME;
use stock_insight::server::{AppState, configure};
use stock_insight::{AnalysisEngine, InsightConfig, MarketData};

fn state() -> web::Data<AppState> {
    let market = MarketData::with_sources(
        Arc::new(SimulatedSource::new("integration test")),
        None,
        None,
        &InsightConfig::default(),
    );
    web::Data::new(AppState::new(AnalysisEngine::with_market(market)).unwrap())
}

#[actix_web::test]
async fn test_healthz() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
    let req = test::TestRequest::get().uri("/healthz").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_analyze_shape() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
    let req = test::TestRequest::get()
        .uri("/api/analyze?code=000001")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["symbol"]["yahoo"], "000001.SZ");
    assert_eq!(body["symbol"]["market"], "Shenzhen");
    assert_eq!(body["years"], 1);
    for field in ["prices", "performance", "valuation", "macd", "kdj", "signals", "news", "warnings"] {
        assert!(body.get(field).is_some(), "missing {field}");
    }
    assert_eq!(body["valuation"]["origin"]["kind"], "simulated");

    let bars = body["prices"]["bars"].as_array().unwrap();
    assert_eq!(body["macd"].as_array().unwrap().len(), bars.len());
}

#[actix_web::test]
async fn test_error_mapping() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;

    let cases = [
        ("/api/analyze?code=%24%24%24", StatusCode::BAD_REQUEST),
        ("/api/analyze?code=AAPL&years=abc", StatusCode::BAD_REQUEST),
        ("/api/analyze?code=AAPL&years=0", StatusCode::BAD_REQUEST),
        ("/api/report?code=toolongticker", StatusCode::BAD_REQUEST),
    ];
    for (uri, expected) in cases {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "{uri}");

        let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[actix_web::test]
async fn test_report_attachment() {
    let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
    let req = test::TestRequest::get()
        .uri("/api/report?code=600519&years=2")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), XLSX_MIME);
    let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap();
    assert!(disposition.to_str().unwrap().contains("600519_report.xlsx"));
    assert!(test::read_body(resp).await.starts_with(b"PK"));
}
