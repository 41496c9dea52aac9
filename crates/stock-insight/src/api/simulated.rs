//! Deterministic offline data used when providers are unreachable
//!
//! Output depends only on the symbol (and the requested window), so the same
//! ticker renders the same dashboard across restarts.

use crate::api::{FundamentalSource, PriceSource};
use crate::data::{DataOrigin, PriceBar, ValuationMetrics};
use crate::error::Result;
use crate::symbol::Symbol;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

const PROVIDER: &str = "Simulated";
const START_PRICE: f64 = 100.0;
const PRICE_FLOOR: f64 = 1.0;
const VALUATION_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Random-walk price and valuation generator
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    reason: String,
}

impl SimulatedSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn origin(&self) -> DataOrigin {
        DataOrigin::simulated(self.reason.clone())
    }

    /// Weekday bars in `[start, end]` following a Gaussian random walk
    pub fn generate_bars(&self, symbol: &Symbol, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
        let mut rng = StdRng::seed_from_u64(stable_hash(&symbol.yahoo));
        let mut bars = Vec::new();
        let mut close = START_PRICE;
        let mut previous_close: Option<f64> = None;

        for date in start.iter_days().take_while(|d| *d <= end) {
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }

            let step: f64 = rng.sample(StandardNormal);
            close = (close + step).max(PRICE_FLOOR);
            let high = close + rng.gen_range(0.0..2.0);
            let low = (close - rng.gen_range(0.0..2.0)).max(PRICE_FLOOR * 0.5);
            let open = previous_close.unwrap_or(close).clamp(low, high);
            let volume = rng.gen_range(100_000..10_000_000);

            bars.push(PriceBar {
                date,
                open: round2(open),
                high: round2(high),
                low: round2(low),
                close: round2(close),
                volume,
            });
            previous_close = Some(close);
        }

        bars
    }

    /// Plausible valuation figures for the symbol
    pub fn generate_valuation(&self, symbol: &Symbol) -> ValuationMetrics {
        let mut rng = StdRng::seed_from_u64(stable_hash(&symbol.yahoo) ^ VALUATION_SALT);
        let pe = round2(rng.gen_range(10.0..30.0));
        let pb = round2(rng.gen_range(1.0..5.0));
        let growth = round2(rng.gen_range(-10.0..30.0));
        let roe = round2(rng.gen_range(5.0..25.0));
        let industry = round2(pe * rng.gen_range(0.8..1.2));

        ValuationMetrics {
            pe_ttm: Some(pe),
            pb: Some(pb),
            roe: Some(roe),
            profit_growth_yoy: Some(growth),
            industry_avg_pe: Some(industry),
            origin: self.origin(),
        }
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new("live data unavailable")
    }
}

#[async_trait]
impl PriceSource for SimulatedSource {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn daily_bars(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        Ok(self.generate_bars(symbol, start, end))
    }
}

#[async_trait]
impl FundamentalSource for SimulatedSource {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn valuation(&self, symbol: &Symbol) -> Result<ValuationMetrics> {
        Ok(self.generate_valuation(symbol))
    }
}

/// FNV-1a; `std`'s hasher is randomly keyed per process
fn stable_hash(text: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    text.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
