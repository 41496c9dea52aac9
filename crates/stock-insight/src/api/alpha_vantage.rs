//! Alpha Vantage API client (company overview / valuation)

use crate::api::FundamentalSource;
use crate::data::{DataOrigin, ValuationMetrics};
use crate::error::{InsightError, Result};
use crate::symbol::{Market, Symbol};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

/// Subset of the `OVERVIEW` response used for valuation
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyOverview {
    #[serde(rename = "Symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Industry")]
    pub industry: Option<String>,
    #[serde(rename = "PERatio")]
    pub pe_ratio: Option<String>,
    #[serde(rename = "PriceToBookRatio")]
    pub price_to_book: Option<String>,
    #[serde(rename = "ReturnOnEquityTTM")]
    pub return_on_equity: Option<String>,
    #[serde(rename = "QuarterlyEarningsGrowthYOY")]
    pub earnings_growth_yoy: Option<String>,
}

impl CompanyOverview {
    /// Convert to metrics; ratios given as fractions become percentages
    pub fn to_metrics(&self) -> ValuationMetrics {
        ValuationMetrics {
            pe_ttm: parse_number(self.pe_ratio.as_deref()),
            pb: parse_number(self.price_to_book.as_deref()),
            roe: parse_number(self.return_on_equity.as_deref()).map(to_percent),
            profit_growth_yoy: parse_number(self.earnings_growth_yoy.as_deref()).map(to_percent),
            industry_avg_pe: None,
            origin: DataOrigin::live(PROVIDER),
        }
    }
}

/// Alpha Vantage reports missing values as "None" or "-"
fn parse_number(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    match raw {
        "" | "None" | "-" => None,
        _ => raw.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

fn to_percent(fraction: f64) -> f64 {
    (fraction * 100.0 * 100.0).round() / 100.0
}

/// Alpha Vantage uses `.SHH` / `.SHZ` for mainland listings
fn alpha_vantage_ticker(symbol: &Symbol) -> String {
    match symbol.market {
        Market::Shanghai => format!("{}.SHH", symbol.code()),
        Market::Shenzhen => format!("{}.SHZ", symbol.code()),
        _ => symbol.yahoo.clone(),
    }
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client with API key and rate limit
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `rate_limit` - Maximum requests per minute (free tier: 5)
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            rate_limiter,
        }
    }

    /// Point the client at a different endpoint (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch the company overview
    pub async fn get_company_overview(&self, ticker: &str) -> Result<CompanyOverview> {
        self.rate_limiter.until_ready().await;

        let params = [
            ("function", "OVERVIEW"),
            ("symbol", ticker),
            ("apikey", self.api_key.as_str()),
        ];

        let response = self.client.get(&self.base_url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::ApiError {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        let data: serde_json::Value = response.json().await?;

        if let Some(error) = data.get("Error Message") {
            return Err(InsightError::ApiError {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                message: error.to_string(),
            });
        }

        // Throttling arrives as a 200 with a Note/Information body
        if data.get("Note").is_some() || data.get("Information").is_some() {
            return Err(InsightError::RateLimitExceeded {
                provider: PROVIDER.to_string(),
            });
        }

        if data.as_object().is_none_or(serde_json::Map::is_empty) {
            return Err(InsightError::DataUnavailable {
                symbol: ticker.to_string(),
                reason: "empty company overview".to_string(),
            });
        }

        Ok(serde_json::from_value(data)?)
    }
}

#[async_trait]
impl FundamentalSource for AlphaVantageClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn valuation(&self, symbol: &Symbol) -> Result<ValuationMetrics> {
        let overview = self.get_company_overview(&alpha_vantage_ticker(symbol)).await?;
        tracing::debug!(
            symbol = %symbol,
            name = overview.name.as_deref().unwrap_or("-"),
            industry = overview.industry.as_deref().unwrap_or("-"),
            "fetched company overview"
        );
        Ok(overview.to_metrics())
    }
}
