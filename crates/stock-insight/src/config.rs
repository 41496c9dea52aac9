//! Configuration for the stock insight service

use crate::error::{InsightError, Result};
use insight_utils::{env_parse, env_string};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Port the dashboard listens on unless told otherwise
pub const DEFAULT_PORT: u16 = 8501;

/// Configuration for data retrieval and serving
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightConfig {
    /// Interface to bind the HTTP server to
    pub host: String,

    /// Port to bind the HTTP server to
    pub port: u16,

    /// Cache TTL for daily price history
    pub cache_ttl_prices: Duration,

    /// Cache TTL for valuation data
    pub cache_ttl_fundamental: Duration,

    /// Cache TTL for news data
    pub cache_ttl_news: Duration,

    /// Maximum number of attempts for upstream calls
    pub max_retries: u32,

    /// Initial backoff duration for retries
    pub retry_backoff_base: Duration,

    /// Upper bound for a single backoff
    pub retry_backoff_max: Duration,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Alpha Vantage API key (optional, enables live valuation data)
    pub alpha_vantage_api_key: Option<String>,

    /// Alpha Vantage requests per minute
    pub alpha_vantage_rate_limit: u32,

    /// Finnhub API key (optional, enables news)
    pub finnhub_api_key: Option<String>,

    /// Finnhub requests per minute
    pub finnhub_rate_limit: u32,

    /// Number of headlines kept in a digest
    pub news_limit: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cache_ttl_prices: Duration::from_secs(600),         // 10 minutes
            cache_ttl_fundamental: Duration::from_secs(3600),   // 1 hour
            cache_ttl_news: Duration::from_secs(300),           // 5 minutes
            max_retries: 3,
            retry_backoff_base: Duration::from_millis(500),
            retry_backoff_max: Duration::from_secs(8),
            request_timeout: Duration::from_secs(30),
            alpha_vantage_api_key: None,
            alpha_vantage_rate_limit: 5,
            finnhub_api_key: None,
            finnhub_rate_limit: 60,
            news_limit: 10,
        }
    }
}

impl InsightConfig {
    /// Create a new configuration builder
    pub fn builder() -> InsightConfigBuilder {
        InsightConfigBuilder::default()
    }

    /// Defaults overlaid with `STOCK_INSIGHT_*` and provider key variables
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(InsightError::ConfigError(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if self.host.trim().is_empty() {
            return Err(InsightError::ConfigError("host must not be empty".to_string()));
        }

        if self.alpha_vantage_rate_limit == 0 || self.finnhub_rate_limit == 0 {
            return Err(InsightError::ConfigError(
                "provider rate limits must be greater than 0".to_string(),
            ));
        }

        if self.news_limit == 0 {
            return Err(InsightError::ConfigError(
                "news_limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Address string suitable for logging
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for InsightConfig
#[derive(Debug, Default)]
pub struct InsightConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    cache_ttl_prices: Option<Duration>,
    cache_ttl_fundamental: Option<Duration>,
    cache_ttl_news: Option<Duration>,
    max_retries: Option<u32>,
    retry_backoff_base: Option<Duration>,
    retry_backoff_max: Option<Duration>,
    request_timeout: Option<Duration>,
    alpha_vantage_api_key: Option<String>,
    alpha_vantage_rate_limit: Option<u32>,
    finnhub_api_key: Option<String>,
    finnhub_rate_limit: Option<u32>,
    news_limit: Option<usize>,
}

impl InsightConfigBuilder {
    /// Set the bind host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the bind port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set cache TTL for price history
    pub fn cache_ttl_prices(mut self, duration: Duration) -> Self {
        self.cache_ttl_prices = Some(duration);
        self
    }

    /// Set cache TTL for valuation data
    pub fn cache_ttl_fundamental(mut self, duration: Duration) -> Self {
        self.cache_ttl_fundamental = Some(duration);
        self
    }

    /// Set cache TTL for news data
    pub fn cache_ttl_news(mut self, duration: Duration) -> Self {
        self.cache_ttl_news = Some(duration);
        self
    }

    /// Set maximum retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set retry backoff cap
    pub fn retry_backoff_max(mut self, duration: Duration) -> Self {
        self.retry_backoff_max = Some(duration);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set Alpha Vantage requests per minute
    pub fn alpha_vantage_rate_limit(mut self, per_minute: u32) -> Self {
        self.alpha_vantage_rate_limit = Some(per_minute);
        self
    }

    /// Set Finnhub API key
    pub fn finnhub_api_key(mut self, key: impl Into<String>) -> Self {
        self.finnhub_api_key = Some(key.into());
        self
    }

    /// Set Finnhub requests per minute
    pub fn finnhub_rate_limit(mut self, per_minute: u32) -> Self {
        self.finnhub_rate_limit = Some(per_minute);
        self
    }

    /// Set number of headlines kept per digest
    pub fn news_limit(mut self, limit: usize) -> Self {
        self.news_limit = Some(limit);
        self
    }

    /// Overlay values from the environment. Values already set on the
    /// builder are kept.
    pub fn with_env(mut self) -> Result<Self> {
        if self.host.is_none() {
            self.host = env_string("STOCK_INSIGHT_HOST");
        }
        if self.port.is_none() {
            self.port = env_parse("STOCK_INSIGHT_PORT")?;
        }
        if self.max_retries.is_none() {
            self.max_retries = env_parse("STOCK_INSIGHT_MAX_RETRIES")?;
        }
        if self.request_timeout.is_none() {
            self.request_timeout =
                env_parse::<u64>("STOCK_INSIGHT_REQUEST_TIMEOUT_SECS")?.map(Duration::from_secs);
        }
        if self.news_limit.is_none() {
            self.news_limit = env_parse("STOCK_INSIGHT_NEWS_LIMIT")?;
        }
        if self.alpha_vantage_api_key.is_none() {
            self.alpha_vantage_api_key = env_string("ALPHA_VANTAGE_API_KEY");
        }
        if self.finnhub_api_key.is_none() {
            self.finnhub_api_key = env_string("FINNHUB_API_KEY");
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<InsightConfig> {
        let defaults = InsightConfig::default();

        let config = InsightConfig {
            host: self.host.unwrap_or(defaults.host),
            port: self.port.unwrap_or(defaults.port),
            cache_ttl_prices: self.cache_ttl_prices.unwrap_or(defaults.cache_ttl_prices),
            cache_ttl_fundamental: self.cache_ttl_fundamental.unwrap_or(defaults.cache_ttl_fundamental),
            cache_ttl_news: self.cache_ttl_news.unwrap_or(defaults.cache_ttl_news),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(defaults.retry_backoff_base),
            retry_backoff_max: self.retry_backoff_max.unwrap_or(defaults.retry_backoff_max),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            alpha_vantage_rate_limit: self
                .alpha_vantage_rate_limit
                .unwrap_or(defaults.alpha_vantage_rate_limit),
            finnhub_api_key: self.finnhub_api_key,
            finnhub_rate_limit: self.finnhub_rate_limit.unwrap_or(defaults.finnhub_rate_limit),
            news_limit: self.news_limit.unwrap_or(defaults.news_limit),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InsightConfig::default();
        assert_eq!(config.port, 8501);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.bind_address(), "0.0.0.0:8501");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = InsightConfig::builder()
            .host("127.0.0.1")
            .port(9000)
            .max_retries(5)
            .request_timeout(Duration::from_secs(60))
            .finnhub_api_key("key")
            .build()
            .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.finnhub_api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_validation_zero_retries() {
        let config = InsightConfig {
            max_retries: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_rate_limit() {
        let result = InsightConfig::builder().alpha_vantage_rate_limit(0).build();
        assert!(matches!(result, Err(InsightError::ConfigError(_))));
    }

    #[test]
    fn test_builder_values_win_over_env() {
        let config = InsightConfig::builder()
            .port(1234)
            .with_env()
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.port, 1234);
    }
}
