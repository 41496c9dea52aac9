//! Market data types shared by sources, indicators and reports

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Where a piece of data came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataOrigin {
    /// Fetched from a remote provider
    Live { provider: String },
    /// Generated locally because the provider was unavailable
    Simulated { reason: String },
}

impl DataOrigin {
    pub fn live(provider: impl Into<String>) -> Self {
        Self::Live {
            provider: provider.into(),
        }
    }

    pub fn simulated(reason: impl Into<String>) -> Self {
        Self::Simulated {
            reason: reason.into(),
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, Self::Simulated { .. })
    }

    /// Short label for dashboards and reports
    pub fn label(&self) -> String {
        match self {
            Self::Live { provider } => provider.clone(),
            Self::Simulated { .. } => "Simulated".to_string(),
        }
    }
}

/// Daily price history for one symbol, ascending by date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
    pub origin: DataOrigin,
}

impl PriceSeries {
    /// Build a series, sorting bars by date and dropping duplicate dates
    /// (the last bar for a date wins).
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>, origin: DataOrigin) -> Self {
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            symbol: symbol.into(),
            bars: deduped,
            origin,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    /// The most recent `n` bars
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        &self.bars[self.bars.len().saturating_sub(n)..]
    }
}

/// Valuation and profitability figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationMetrics {
    /// Price/earnings, trailing twelve months
    pub pe_ttm: Option<f64>,
    /// Price/book
    pub pb: Option<f64>,
    /// Return on equity, percent
    pub roe: Option<f64>,
    /// Net profit growth year over year, percent
    pub profit_growth_yoy: Option<f64>,
    /// Industry average P/E
    pub industry_avg_pe: Option<f64>,
    pub origin: DataOrigin,
}

impl ValuationMetrics {
    /// Metrics with every field missing
    pub fn empty(origin: DataOrigin) -> Self {
        Self {
            pe_ttm: None,
            pb: None,
            roe: None,
            profit_growth_yoy: None,
            industry_avg_pe: None,
            origin,
        }
    }

    /// Whether any field is missing
    pub fn has_gaps(&self) -> bool {
        self.pe_ttm.is_none()
            || self.pb.is_none()
            || self.roe.is_none()
            || self.profit_growth_yoy.is_none()
            || self.industry_avg_pe.is_none()
    }

    /// Fill missing fields from `other`, keeping this origin
    pub fn fill_from(&mut self, other: &ValuationMetrics) {
        self.pe_ttm = self.pe_ttm.or(other.pe_ttm);
        self.pb = self.pb.or(other.pb);
        self.roe = self.roe.or(other.roe);
        self.profit_growth_yoy = self.profit_growth_yoy.or(other.profit_growth_yoy);
        self.industry_avg_pe = self.industry_avg_pe.or(other.industry_avg_pe);
    }
}
