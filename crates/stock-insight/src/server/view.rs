//! Dashboard view model and template environment

use minijinja::Environment;
use serde::Serialize;

use crate::chart;
use crate::engine::{AnalysisReport, DataFreshness};
use crate::error::Result;
use crate::market::YEARS_RANGE;
use crate::valuation::{format_metric, interpret_pe, pe_vs_industry};

pub const DASHBOARD_TEMPLATE: &str = "dashboard.html";

/// Rows shown in the recent prices table
const RECENT_BARS: usize = 10;

/// Load the embedded templates
pub fn templates() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template(DASHBOARD_TEMPLATE, include_str!("../../templates/dashboard.html"))?;
    Ok(env)
}

/// Everything the dashboard template renders
#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub code: String,
    pub years: u32,
    pub year_options: Vec<u32>,
    pub error: Option<String>,
    pub report: Option<ReportView>,
}

impl DashboardView {
    pub fn new(code: &str, years: u32) -> Self {
        Self {
            code: code.to_string(),
            years,
            year_options: YEARS_RANGE.collect(),
            error: None,
            report: None,
        }
    }

    pub fn with_report(mut self, report: &AnalysisReport) -> Self {
        self.report = Some(ReportView::from(report));
        self
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct MetricRow {
    pub name: &'static str,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct BarRow {
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: u64,
}

#[derive(Debug, Serialize)]
pub struct SignalRow {
    pub label: &'static str,
    pub bullish: bool,
}

#[derive(Debug, Serialize)]
pub struct NewsRow {
    pub date: String,
    pub source: String,
    pub title: String,
    pub url: String,
    pub sentiment: &'static str,
}

/// Pre-formatted report fields
#[derive(Debug, Serialize)]
pub struct ReportView {
    pub code: String,
    pub symbol: String,
    pub summary: String,
    pub freshness: DataFreshness,
    pub price_origin: String,
    pub latest_close: String,
    pub change_1m: String,
    pub change_3m: String,
    pub change_1y: String,
    pub recent_bars: Vec<BarRow>,
    pub valuation: Vec<MetricRow>,
    pub valuation_origin: String,
    pub pe_band: Option<&'static str>,
    pub pe_premium: Option<String>,
    pub latest_macd: Vec<MetricRow>,
    pub latest_kdj: Vec<MetricRow>,
    pub signals: Vec<SignalRow>,
    pub price_chart: String,
    pub macd_chart: String,
    pub kdj_chart: String,
    pub news_summary: String,
    pub news_origin: String,
    pub news: Vec<NewsRow>,
    pub warnings: Vec<String>,
    pub file_name: String,
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "—".to_string(), |v| format!("{v:+.2}%"))
}

impl From<&AnalysisReport> for ReportView {
    fn from(report: &AnalysisReport) -> Self {
        let perf = &report.performance;
        let metrics = &report.valuation;

        let recent_bars = report
            .prices
            .tail(RECENT_BARS)
            .iter()
            .rev()
            .map(|bar| BarRow {
                date: bar.date.to_string(),
                open: format!("{:.2}", bar.open),
                high: format!("{:.2}", bar.high),
                low: format!("{:.2}", bar.low),
                close: format!("{:.2}", bar.close),
                volume: bar.volume,
            })
            .collect();

        let latest_macd = report
            .macd
            .last()
            .map(|p| {
                vec![
                    MetricRow { name: "DIF", value: format!("{:.3}", p.values.dif) },
                    MetricRow { name: "DEA", value: format!("{:.3}", p.values.dea) },
                    MetricRow { name: "MACD", value: format!("{:.3}", p.values.histogram) },
                ]
            })
            .unwrap_or_default();

        let latest_kdj = report
            .kdj
            .last()
            .map(|p| {
                vec![
                    MetricRow { name: "K", value: format_metric(p.values.k) },
                    MetricRow { name: "D", value: format_metric(p.values.d) },
                    MetricRow { name: "J", value: format_metric(p.values.j) },
                ]
            })
            .unwrap_or_default();

        let news = report
            .news
            .headlines
            .iter()
            .map(|item| NewsRow {
                date: item.headline.published.format("%Y-%m-%d %H:%M").to_string(),
                source: item.headline.source.clone(),
                title: item.headline.title.clone(),
                url: item.headline.url.clone(),
                sentiment: item.sentiment.label(),
            })
            .collect();

        Self {
            code: report.symbol.input.clone(),
            symbol: report.symbol.to_string(),
            summary: report.summary(),
            freshness: report.freshness(),
            price_origin: report.prices.origin.label(),
            latest_close: format_metric(perf.latest_close),
            change_1m: percent(perf.change_1m),
            change_3m: percent(perf.change_3m),
            change_1y: percent(perf.change_1y),
            recent_bars,
            valuation: vec![
                MetricRow { name: "PE (TTM)", value: format_metric(metrics.pe_ttm) },
                MetricRow { name: "PB", value: format_metric(metrics.pb) },
                MetricRow { name: "ROE (%)", value: format_metric(metrics.roe) },
                MetricRow {
                    name: "Profit growth YoY (%)",
                    value: format_metric(metrics.profit_growth_yoy),
                },
                MetricRow { name: "Industry avg PE", value: format_metric(metrics.industry_avg_pe) },
            ],
            valuation_origin: metrics.origin.label(),
            pe_band: metrics.pe_ttm.map(interpret_pe),
            pe_premium: pe_vs_industry(metrics).map(|p| format!("{p:+.1}%")),
            latest_macd,
            latest_kdj,
            signals: report
                .signals
                .iter()
                .map(|s| SignalRow { label: s.label(), bullish: s.is_bullish() })
                .collect(),
            price_chart: chart::price_chart(report),
            macd_chart: chart::macd_chart(report),
            kdj_chart: chart::kdj_chart(report),
            news_summary: report.news.summary.clone(),
            news_origin: report.news.origin.label(),
            news,
            warnings: report.warnings.clone(),
            file_name: report.report_file_name(),
        }
    }
}
