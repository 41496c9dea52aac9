//! Moving-average convergence/divergence

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ta::Next;
use ta::indicators::ExponentialMovingAverage;

use crate::error::{InsightError, Result};

pub const FAST_SPAN: usize = 12;
pub const SLOW_SPAN: usize = 26;
pub const SIGNAL_SPAN: usize = 9;

/// MACD values for one bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValues {
    /// Fast EMA minus slow EMA
    pub dif: f64,
    /// Signal line, EMA of DIF
    pub dea: f64,
    /// 2 × (DIF − DEA), the convention used by mainland charting software
    pub histogram: f64,
}

/// MACD values tagged with their bar date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdPoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub values: MacdValues,
}

/// Non-adjusted exponential moving average: the first output equals the
/// first input, then `y = α·x + (1−α)·y_prev` with `α = 2/(span+1)`.
pub fn ema(values: &[f64], span: usize) -> Result<Vec<f64>> {
    let mut ema = ExponentialMovingAverage::new(span)
        .map_err(|e| InsightError::InvalidInput(format!("EMA span {span}: {e}")))?;
    Ok(values.iter().map(|&v| ema.next(v)).collect())
}

/// MACD(12, 26, 9) over closing prices
pub fn macd(closes: &[f64]) -> Result<Vec<MacdValues>> {
    let fast = ema(closes, FAST_SPAN)?;
    let slow = ema(closes, SLOW_SPAN)?;
    let dif: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let dea = ema(&dif, SIGNAL_SPAN)?;

    Ok(dif
        .into_iter()
        .zip(dea)
        .map(|(dif, dea)| MacdValues {
            dif,
            dea,
            histogram: 2.0 * (dif - dea),
        })
        .collect())
}
