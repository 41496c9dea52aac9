//! Market data service: providers, retries, caching and offline fallback

use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{
    AlphaVantageClient, FinnhubClient, FundamentalSource, NewsSource, PriceSource,
    SimulatedSource, YahooFinanceClient,
};
use crate::cache::{CacheKey, CacheManager};
use crate::config::InsightConfig;
use crate::data::{DataOrigin, PriceSeries, ValuationMetrics};
use crate::error::{InsightError, Result};
use crate::news::NewsDigest;
use crate::retry::RetryPolicy;
use crate::symbol::Symbol;

/// Allowed history window in years
pub const YEARS_RANGE: std::ops::RangeInclusive<u32> = 1..=5;

/// Days of news included in a digest
const NEWS_LOOKBACK_DAYS: i64 = 7;

/// A value plus notes about how it was obtained
#[derive(Debug, Clone)]
pub struct Sourced<T> {
    pub value: T,
    pub warnings: Vec<String>,
}

impl<T> Sourced<T> {
    fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }
}

/// Fetches prices, valuation and news with graceful degradation
#[derive(Clone)]
pub struct MarketData {
    prices: Arc<dyn PriceSource>,
    fundamentals: Option<Arc<dyn FundamentalSource>>,
    news: Option<Arc<dyn NewsSource>>,
    simulated: SimulatedSource,
    cache: CacheManager,
    retry: RetryPolicy,
    news_limit: usize,
}

impl MarketData {
    /// Build the provider stack described by the configuration
    pub fn new(config: &InsightConfig) -> Self {
        let fundamentals = config.alpha_vantage_api_key.as_ref().map(|key| {
            Arc::new(AlphaVantageClient::new(
                key.clone(),
                config.alpha_vantage_rate_limit,
                config.request_timeout,
            )) as Arc<dyn FundamentalSource>
        });
        let news = config.finnhub_api_key.as_ref().map(|key| {
            Arc::new(FinnhubClient::new(
                key.clone(),
                config.finnhub_rate_limit,
                config.request_timeout,
            )) as Arc<dyn NewsSource>
        });

        info!(
            fundamentals = fundamentals.is_some(),
            news = news.is_some(),
            "market data providers configured"
        );

        Self::with_sources(
            Arc::new(YahooFinanceClient::new()),
            fundamentals,
            news,
            config,
        )
    }

    /// Build with explicit sources
    pub fn with_sources(
        prices: Arc<dyn PriceSource>,
        fundamentals: Option<Arc<dyn FundamentalSource>>,
        news: Option<Arc<dyn NewsSource>>,
        config: &InsightConfig,
    ) -> Self {
        Self {
            prices,
            fundamentals,
            news,
            simulated: SimulatedSource::default(),
            cache: CacheManager::from_config(config),
            retry: RetryPolicy::from_config(config),
            news_limit: config.news_limit,
        }
    }

    /// Replace the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Daily history covering the last `years` years, ending today
    pub async fn price_history(&self, symbol: &Symbol, years: u32) -> Result<Sourced<PriceSeries>> {
        let (start, end) = history_window(years, Utc::now().date_naive())?;
        let key = CacheKey::new(&symbol.yahoo, "daily_bars", json!({ "start": start, "end": end }));

        let fetched = self
            .cache
            .prices
            .get_or_fetch(key, || async {
                let bars = self
                    .retry
                    .execute("daily_bars", || self.prices.daily_bars(symbol, start, end))
                    .await?;
                if bars.is_empty() {
                    return Err(InsightError::DataUnavailable {
                        symbol: symbol.yahoo.clone(),
                        reason: "provider returned no bars".to_string(),
                    });
                }
                Ok(bars)
            })
            .await;

        match fetched {
            Ok(bars) => Ok(Sourced::clean(PriceSeries::new(
                &symbol.yahoo,
                bars,
                DataOrigin::live(self.prices.name()),
            ))),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "price history unavailable, using simulated data");
                let simulated = SimulatedSource::new(e.to_string());
                let bars = simulated.generate_bars(symbol, start, end);
                Ok(Sourced {
                    value: PriceSeries::new(&symbol.yahoo, bars, simulated.origin()),
                    warnings: vec![format!(
                        "Price data for {symbol} is simulated ({} unavailable: {e})",
                        self.prices.name()
                    )],
                })
            }
        }
    }

    /// Valuation metrics; gaps are filled from the simulated source
    pub async fn valuation(&self, symbol: &Symbol) -> Sourced<ValuationMetrics> {
        let fallback = self.simulated.generate_valuation(symbol);

        let Some(source) = &self.fundamentals else {
            return Sourced {
                value: fallback,
                warnings: vec!["Valuation metrics are simulated (no fundamentals provider configured)".to_string()],
            };
        };

        let key = CacheKey::new(&symbol.yahoo, "valuation", json!({}));
        let fetched = self
            .cache
            .fundamentals
            .get_or_fetch(key, || async {
                self.retry
                    .execute("valuation", || source.valuation(symbol))
                    .await
            })
            .await;

        match fetched {
            Ok(mut metrics) => {
                let mut warnings = Vec::new();
                let missing = missing_fields(&metrics);
                // Providers do not publish an industry average; it is always derived
                let only_industry = missing == ["industry_avg_pe"];
                if metrics.has_gaps() {
                    metrics.fill_from(&fallback);
                    if !only_industry {
                        warnings.push(format!(
                            "Some valuation fields are simulated: {}",
                            missing.join(", ")
                        ));
                    }
                }
                Sourced {
                    value: metrics,
                    warnings,
                }
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "valuation unavailable, using simulated data");
                Sourced {
                    value: fallback,
                    warnings: vec![format!(
                        "Valuation metrics are simulated ({} unavailable: {e})",
                        source.name()
                    )],
                }
            }
        }
    }

    /// Digest of the last week of company news
    pub async fn news(&self, symbol: &Symbol) -> Sourced<NewsDigest> {
        let Some(source) = &self.news else {
            return Sourced::clean(NewsDigest::unavailable("no news provider configured"));
        };

        let to = Utc::now().date_naive();
        let from = to - ChronoDuration::days(NEWS_LOOKBACK_DAYS);
        let key = CacheKey::new(&symbol.yahoo, "news", json!({ "from": from, "to": to }));

        let fetched = self
            .cache
            .news
            .get_or_fetch(key, || async {
                self.retry
                    .execute("headlines", || source.headlines(symbol, from, to))
                    .await
            })
            .await;

        match fetched {
            Ok(headlines) => Sourced::clean(NewsDigest::from_headlines(
                headlines,
                self.news_limit,
                DataOrigin::live(source.name()),
            )),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "news unavailable");
                Sourced {
                    value: NewsDigest::unavailable(e.to_string()),
                    warnings: vec![format!("News unavailable from {}: {e}", source.name())],
                }
            }
        }
    }
}

/// `[end − 365·years, end]`, validating `years`
pub fn history_window(years: u32, end: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    if !YEARS_RANGE.contains(&years) {
        return Err(InsightError::InvalidInput(format!(
            "years must be between {} and {}, got {years}",
            YEARS_RANGE.start(),
            YEARS_RANGE.end()
        )));
    }
    Ok((end - ChronoDuration::days(365 * i64::from(years)), end))
}

fn missing_fields(metrics: &ValuationMetrics) -> Vec<&'static str> {
    [
        ("pe_ttm", metrics.pe_ttm),
        ("pb", metrics.pb),
        ("roe", metrics.roe),
        ("profit_growth_yoy", metrics.profit_growth_yoy),
        ("industry_avg_pe", metrics.industry_avg_pe),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.is_none().then_some(name))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockFundamentalSource, MockNewsSource, MockPriceSource};
    use crate::data::PriceBar;
    use crate::news::Headline;

    fn config() -> InsightConfig {
        InsightConfig::default()
    }

    fn bars() -> Vec<PriceBar> {
        (1..=5)
            .map(|day| PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                open: 10.0,
                high: 11.0,
                low: 9.0,
                close: 10.0 + f64::from(day),
                volume: 100,
            })
            .collect()
    }

    fn symbol() -> Symbol {
        Symbol::parse("600519").unwrap()
    }

    #[test]
    fn test_history_window() {
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let (start, _) = history_window(1, end).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(history_window(0, end).is_err());
        assert!(history_window(6, end).is_err());
    }

    #[tokio::test]
    async fn test_live_prices_are_cached() {
        let mut prices = MockPriceSource::new();
        prices.expect_name().return_const("Mock".to_string());
        prices
            .expect_daily_bars()
            .times(1)
            .returning(|_, _, _| Ok(bars()));

        let market = MarketData::with_sources(Arc::new(prices), None, None, &config())
            .with_retry(RetryPolicy::fast());

        let first = market.price_history(&symbol(), 1).await.unwrap();
        assert_eq!(first.value.origin, DataOrigin::live("Mock"));
        assert_eq!(first.value.len(), 5);
        assert!(first.warnings.is_empty());

        let second = market.price_history(&symbol(), 1).await.unwrap();
        assert_eq!(second.value.closes(), first.value.closes());
        assert_eq!(market.cache().prices.len().await, 1);
    }

    #[tokio::test]
    async fn test_prices_fall_back_to_simulated() {
        let mut prices = MockPriceSource::new();
        prices.expect_name().return_const("Mock".to_string());
        prices.expect_daily_bars().times(3).returning(|_, _, _| {
            Err(InsightError::RateLimitExceeded {
                provider: "Mock".to_string(),
            })
        });

        let market = MarketData::with_sources(Arc::new(prices), None, None, &config())
            .with_retry(RetryPolicy::fast());

        let result = market.price_history(&symbol(), 1).await.unwrap();
        assert!(result.value.origin.is_simulated());
        assert!(result.value.len() > 200);
        assert_eq!(result.warnings.len(), 1);
        assert!(market.cache().prices.is_empty().await);
    }

    #[tokio::test]
    async fn test_empty_history_falls_back() {
        let mut prices = MockPriceSource::new();
        prices.expect_name().return_const("Mock".to_string());
        prices.expect_daily_bars().times(1).returning(|_, _, _| Ok(Vec::new()));

        let market = MarketData::with_sources(Arc::new(prices), None, None, &config())
            .with_retry(RetryPolicy::fast());

        let result = market.price_history(&symbol(), 2).await.unwrap();
        assert!(result.value.origin.is_simulated());
    }

    #[tokio::test]
    async fn test_invalid_years() {
        let prices = MockPriceSource::new();
        let market = MarketData::with_sources(Arc::new(prices), None, None, &config());
        let result = market.price_history(&symbol(), 9).await;
        assert!(matches!(result, Err(InsightError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_valuation_without_provider_is_simulated() {
        let market =
            MarketData::with_sources(Arc::new(MockPriceSource::new()), None, None, &config());
        let result = market.valuation(&symbol()).await;
        assert!(result.value.origin.is_simulated());
        assert!(!result.value.has_gaps());
        assert_eq!(result.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_valuation_gaps_are_filled() {
        let mut fundamentals = MockFundamentalSource::new();
        fundamentals.expect_name().return_const("Mock".to_string());
        fundamentals.expect_valuation().times(1).returning(|_| {
            Ok(ValuationMetrics {
                pe_ttm: Some(31.5),
                pb: Some(9.2),
                roe: Some(30.0),
                ..ValuationMetrics::empty(DataOrigin::live("Mock"))
            })
        });

        let market = MarketData::with_sources(
            Arc::new(MockPriceSource::new()),
            Some(Arc::new(fundamentals)),
            None,
            &config(),
        );

        let result = market.valuation(&symbol()).await;
        assert_eq!(result.value.pe_ttm, Some(31.5));
        assert!(result.value.profit_growth_yoy.is_some());
        assert!(result.value.industry_avg_pe.is_some());
        assert_eq!(result.value.origin, DataOrigin::live("Mock"));
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("profit_growth_yoy"));
    }

    #[tokio::test]
    async fn test_valuation_failure_falls_back() {
        let mut fundamentals = MockFundamentalSource::new();
        fundamentals.expect_name().return_const("Mock".to_string());
        fundamentals.expect_valuation().times(1).returning(|s| {
            Err(InsightError::DataUnavailable {
                symbol: s.yahoo.clone(),
                reason: "unknown".to_string(),
            })
        });

        let market = MarketData::with_sources(
            Arc::new(MockPriceSource::new()),
            Some(Arc::new(fundamentals)),
            None,
            &config(),
        )
        .with_retry(RetryPolicy::fast());

        let result = market.valuation(&symbol()).await;
        assert!(result.value.origin.is_simulated());
        assert_eq!(result.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_news_digest() {
        let mut news = MockNewsSource::new();
        news.expect_name().return_const("Mock".to_string());
        news.expect_headlines().times(1).returning(|_, _, _| {
            Ok(vec![Headline {
                published: Utc::now(),
                source: "Wire".to_string(),
                title: "Shares surge".to_string(),
                summary: String::new(),
                url: String::new(),
            }])
        });

        let market = MarketData::with_sources(
            Arc::new(MockPriceSource::new()),
            None,
            Some(Arc::new(news)),
            &config(),
        );

        let result = market.news(&symbol()).await;
        assert_eq!(result.value.positive, 1);
        assert_eq!(result.value.origin, DataOrigin::live("Mock"));

        // served from cache the second time
        let again = market.news(&symbol()).await;
        assert_eq!(again.value.headlines.len(), 1);
    }

    #[tokio::test]
    async fn test_news_without_provider() {
        let market =
            MarketData::with_sources(Arc::new(MockPriceSource::new()), None, None, &config());
        let result = market.news(&symbol()).await;
        assert!(result.value.headlines.is_empty());
        assert!(result.warnings.is_empty());
    }
}
