//! News API clients

use crate::api::NewsSource;
use crate::error::{InsightError, Result};
use crate::news::Headline;
use crate::symbol::{Market, Symbol};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER: &str = "Finnhub";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Finnhub news article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinnhubNewsArticle {
    /// Article category
    #[serde(default)]
    pub category: String,
    /// Publish time (UNIX timestamp)
    pub datetime: i64,
    /// News headline
    pub headline: String,
    /// Unique article ID
    #[serde(default)]
    pub id: i64,
    /// Related symbols
    #[serde(default)]
    pub related: String,
    /// News source
    #[serde(default)]
    pub source: String,
    /// Article summary
    #[serde(default)]
    pub summary: String,
    /// Article URL
    #[serde(default)]
    pub url: String,
}

impl FinnhubNewsArticle {
    fn into_headline(self) -> Option<Headline> {
        let published = DateTime::<Utc>::from_timestamp(self.datetime, 0)?;
        Some(Headline {
            published,
            source: self.source,
            title: self.headline,
            summary: self.summary,
            url: self.url,
        })
    }
}

/// Finnhub client for news API
#[derive(Debug, Clone)]
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl FinnhubClient {
    /// Create a new Finnhub client with rate limiting
    ///
    /// # Arguments
    /// * `api_key` - Finnhub API key
    /// * `rate_limit` - Requests per minute (free tier: 60)
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

    /// Get company news for a specific symbol
    ///
    /// # Arguments
    /// * `symbol` - Finnhub symbol (e.g., "AAPL")
    /// * `from` - Start date
    /// * `to` - End date
    pub async fn get_company_news(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<FinnhubNewsArticle>> {
        self.rate_limiter.until_ready().await;

        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();
        let params = [
            ("symbol", symbol),
            ("from", from.as_str()),
            ("to", to.as_str()),
            ("token", self.api_key.as_str()),
        ];

        let response = self
            .client
            .get(format!("{}/company-news", self.base_url))
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(InsightError::RateLimitExceeded {
                provider: PROVIDER.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::ApiError {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.json::<Vec<FinnhubNewsArticle>>().await?)
    }
}

/// Finnhub lists mainland shares as `600519.SS` / `000001.SZ` like Yahoo,
/// Hong Kong as `700.HK` without padding.
fn finnhub_ticker(symbol: &Symbol) -> String {
    match symbol.market {
        Market::HongKong => format!("{}.HK", symbol.code().trim_start_matches('0')),
        _ => symbol.yahoo.clone(),
    }
}

#[async_trait]
impl NewsSource for FinnhubClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn headlines(
        &self,
        symbol: &Symbol,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Headline>> {
        let articles = self.get_company_news(&finnhub_ticker(symbol), from, to).await?;
        Ok(articles
            .into_iter()
            .filter_map(FinnhubNewsArticle::into_headline)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn test_finnhub_ticker() {
        assert_eq!(finnhub_ticker(&Symbol::parse("00700").unwrap()), "700.HK");
        assert_eq!(finnhub_ticker(&Symbol::parse("AAPL").unwrap()), "AAPL");
        assert_eq!(finnhub_ticker(&Symbol::parse("600519").unwrap()), "600519.SS");
    }

    #[tokio::test]
    async fn test_company_news() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/company-news")
                .query_param("symbol", "AAPL")
                .query_param("from", "2024-05-01")
                .query_param("to", "2024-05-07")
                .query_param("token", "test_key");
            then.status(200).json_body(serde_json::json!([
                {
                    "category": "company",
                    "datetime": 1_714_560_000,
                    "headline": "Apple shares surge on record buyback",
                    "id": 1,
                    "related": "AAPL",
                    "source": "Reuters",
                    "summary": "",
                    "url": "https://example.com/a"
                }
            ]));
        });

        let client = FinnhubClient::new("test_key", 600, Duration::from_secs(5))
            .with_base_url(server.base_url());
        let headlines = client
            .headlines(&Symbol::parse("AAPL").unwrap(), date(1), date(7))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(headlines.len(), 1);
        assert_eq!(headlines[0].source, "Reuters");
        assert_eq!(headlines[0].title, "Apple shares surge on record buyback");
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/company-news");
            then.status(429).body("API limit reached");
        });

        let client = FinnhubClient::new("test_key", 600, Duration::from_secs(5))
            .with_base_url(server.base_url());
        let result = client.get_company_news("AAPL", date(1), date(7)).await;
        assert!(matches!(result, Err(InsightError::RateLimitExceeded { .. })));
    }
}
