//! Data source abstractions and provider clients
//!
//! Every remote provider sits behind one of three traits so the market data
//! service can swap in the simulated source when a provider fails.

pub mod alpha_vantage;
pub mod news_apis;
pub mod simulated;
pub mod yahoo;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::data::{PriceBar, ValuationMetrics};
use crate::error::Result;
use crate::news::Headline;
use crate::symbol::Symbol;

pub use alpha_vantage::AlphaVantageClient;
pub use news_apis::FinnhubClient;
pub use simulated::SimulatedSource;
pub use yahoo::YahooFinanceClient;

/// Source of daily OHLCV history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Provider name shown in reports
    fn name(&self) -> &str;

    /// Daily bars between `start` and `end`, inclusive
    async fn daily_bars(&self, symbol: &Symbol, start: NaiveDate, end: NaiveDate)
    -> Result<Vec<PriceBar>>;
}

/// Source of valuation metrics
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FundamentalSource: Send + Sync {
    fn name(&self) -> &str;

    async fn valuation(&self, symbol: &Symbol) -> Result<ValuationMetrics>;
}

/// Source of company news
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    fn name(&self) -> &str;

    async fn headlines(&self, symbol: &Symbol, from: NaiveDate, to: NaiveDate)
    -> Result<Vec<Headline>>;
}
