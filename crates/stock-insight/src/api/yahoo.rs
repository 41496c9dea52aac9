//! Yahoo Finance API client

use crate::api::PriceSource;
use crate::data::PriceBar;
use crate::error::{InsightError, Result};
use crate::symbol::Symbol;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

const PROVIDER: &str = "Yahoo Finance";

/// Yahoo Finance API client
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    /// Get daily history for a Yahoo-qualified ticker
    pub async fn get_historical_quotes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| InsightError::YahooFinanceError(e.to_string()))?;

        let start_odt = to_offset_datetime(start)?;
        // Include the whole end day
        let end_odt = to_offset_datetime(end + chrono::Duration::days(1))?;

        let response = provider
            .get_quote_history(ticker, start_odt, end_odt)
            .await
            .map_err(|e| InsightError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| InsightError::YahooFinanceError(e.to_string()))?;

        let bars: Vec<PriceBar> = quotes
            .iter()
            .filter(|q| q.close.is_finite() && q.close > 0.0)
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                Some(PriceBar {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: q.volume,
                })
            })
            .collect();

        if bars.is_empty() {
            return Err(InsightError::DataUnavailable {
                symbol: ticker.to_string(),
                reason: "No historical data available".to_string(),
            });
        }

        Ok(bars)
    }
}

fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime> {
    let timestamp = date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| InsightError::InvalidInput(format!("invalid date: {date}")))?;

    OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| InsightError::InvalidInput(format!("invalid timestamp for {date}: {e}")))
}

#[async_trait]
impl PriceSource for YahooFinanceClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn daily_bars(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        self.get_historical_quotes(&symbol.yahoo, start, end).await
    }
}
