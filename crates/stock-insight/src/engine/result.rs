//! Analysis result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{PriceSeries, ValuationMetrics};
use crate::indicators::{KdjPoint, MacdPoint, Performance};
use crate::news::NewsDigest;
use crate::signals::Signal;
use crate::symbol::Symbol;

/// How much of the report is backed by live data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFreshness {
    /// Prices and valuation both came from providers
    Live,
    /// Some inputs were simulated
    Partial,
    /// Prices were simulated
    Simulated,
}

/// Everything the dashboard and the Excel export need for one ticker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: Symbol,
    pub years: u32,
    pub generated_at: DateTime<Utc>,
    pub prices: PriceSeries,
    pub performance: Performance,
    pub valuation: ValuationMetrics,
    pub macd: Vec<MacdPoint>,
    pub kdj: Vec<KdjPoint>,
    pub signals: Vec<Signal>,
    pub news: NewsDigest,
    pub warnings: Vec<String>,
}

impl AnalysisReport {
    pub fn freshness(&self) -> DataFreshness {
        if self.prices.origin.is_simulated() {
            DataFreshness::Simulated
        } else if self.valuation.origin.is_simulated() || !self.warnings.is_empty() {
            DataFreshness::Partial
        } else {
            DataFreshness::Live
        }
    }

    /// Download name for the Excel export, e.g. `600519_report.xlsx`
    pub fn report_file_name(&self) -> String {
        crate::report::file_name(&self.symbol.input)
    }

    pub fn summary(&self) -> String {
        let freshness_indicator = match self.freshness() {
            DataFreshness::Live => "🟢",
            DataFreshness::Partial => "🟡",
            DataFreshness::Simulated => "⚠️",
        };

        format!(
            "{} {} - {} bars ({})",
            freshness_indicator,
            self.symbol,
            self.prices.len(),
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        )
    }
}
