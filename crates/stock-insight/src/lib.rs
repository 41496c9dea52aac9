//! Stock insight dashboard
//!
//! Given a ticker or a six-digit A-share code this crate:
//!
//! - resolves it to a market-qualified symbol (`600519` → `600519.SS`)
//! - fetches daily prices (Yahoo Finance), valuation (Alpha Vantage) and
//!   company news (Finnhub), with caching, retries and rate limiting
//! - falls back to deterministic simulated data when a provider is unavailable
//! - computes performance, MACD (12, 26, 9) and KDJ (9, 3, 3) and derives
//!   simple trading signals
//! - renders a tabbed HTML dashboard with SVG charts and exports an Excel
//!   workbook
//!
//! # Example
//!
//! ```rust,ignore
//! use stock_insight::{AnalysisEngine, InsightConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = InsightConfig::from_env()?;
//!     let engine = AnalysisEngine::new(&config);
//!
//!     let report = engine.analyze("600519", 1).await?;
//!     println!("{}", report.summary());
//!     for signal in &report.signals {
//!         println!("{}", signal.label());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod chart;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod market;
pub mod news;
pub mod report;
pub mod retry;
pub mod server;
pub mod signals;
pub mod symbol;
pub mod valuation;

// Re-export main types for convenience
pub use config::InsightConfig;
pub use data::{DataOrigin, PriceBar, PriceSeries, ValuationMetrics};
pub use engine::{AnalysisEngine, AnalysisReport, DataFreshness};
pub use error::{InsightError, Result};
pub use market::MarketData;
pub use report::ExcelReport;
pub use signals::Signal;
pub use symbol::{Market, Symbol};
