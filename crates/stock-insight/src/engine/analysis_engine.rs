//! Stock analysis engine - fetches data and computes indicators

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::InsightConfig;
use crate::error::{InsightError, Result};
use crate::indicators::{self, KdjPoint, MacdPoint};
use crate::market::{self, MarketData};
use crate::signals;
use crate::symbol::Symbol;

use super::result::AnalysisReport;

/// Bars needed before MACD's slow EMA is meaningful
const MIN_BARS_FOR_INDICATORS: usize = 26;

/// Stock analysis engine
#[derive(Clone)]
pub struct AnalysisEngine {
    market: Arc<MarketData>,
}

impl AnalysisEngine {
    pub fn new(config: &InsightConfig) -> Self {
        Self::with_market(MarketData::new(config))
    }

    pub fn with_market(market: MarketData) -> Self {
        Self {
            market: Arc::new(market),
        }
    }

    pub fn market(&self) -> &MarketData {
        &self.market
    }

    /// Run the full analysis for a user-supplied code
    #[instrument(skip(self), fields(symbol))]
    pub async fn analyze(&self, code: &str, years: u32) -> Result<AnalysisReport> {
        let symbol = Symbol::parse(code)?;
        tracing::Span::current().record("symbol", tracing::field::display(&symbol));
        // reject a bad range before any provider quota is spent
        market::history_window(years, Utc::now().date_naive())?;

        let (prices, valuation, news) = tokio::join!(
            self.market.price_history(&symbol, years),
            self.market.valuation(&symbol),
            self.market.news(&symbol),
        );
        let prices = prices?;

        if prices.value.len() < 2 {
            return Err(InsightError::DataUnavailable {
                symbol: symbol.yahoo.clone(),
                reason: format!("only {} price bars available", prices.value.len()),
            });
        }

        let mut warnings = prices.warnings;
        warnings.extend(valuation.warnings);
        warnings.extend(news.warnings);

        let series = prices.value;
        if series.len() < MIN_BARS_FOR_INDICATORS {
            warnings.push(format!(
                "Only {} bars of history; indicators are unreliable",
                series.len()
            ));
        }

        let dates = series.dates();
        let closes = series.closes();
        let macd: Vec<MacdPoint> = dates
            .iter()
            .zip(indicators::macd(&closes)?)
            .map(|(&date, values)| MacdPoint { date, values })
            .collect();
        let kdj: Vec<KdjPoint> = dates
            .iter()
            .zip(indicators::kdj(&series.highs(), &series.lows(), &closes)?)
            .map(|(&date, values)| KdjPoint { date, values })
            .collect();

        let signals = signals::detect(
            macd.last().map(|p| &p.values),
            kdj.last().map(|p| &p.values),
        );
        let performance = indicators::performance(&closes);

        info!(
            bars = series.len(),
            origin = %series.origin.label(),
            signals = signals.len(),
            warnings = warnings.len(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            symbol,
            years,
            generated_at: Utc::now(),
            prices: series,
            performance,
            valuation: valuation.value,
            macd,
            kdj,
            signals,
            news: news.value,
            warnings,
        })
    }
}
