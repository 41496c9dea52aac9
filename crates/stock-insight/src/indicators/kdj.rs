//! KDJ stochastic oscillator (9, 3, 3)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ta::Next;
use ta::indicators::{Maximum, Minimum};

use crate::error::{InsightError, Result};

pub const WINDOW: usize = 9;
const SEED: f64 = 50.0;

/// K, D and J for one bar; `None` while the window is incomplete or flat
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KdjValues {
    pub k: Option<f64>,
    pub d: Option<f64>,
    pub j: Option<f64>,
}

/// KDJ values tagged with their bar date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KdjPoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub values: KdjValues,
}

/// Raw stochastic value per bar
fn rsv(highs: &[f64], lows: &[f64], closes: &[f64]) -> Result<Vec<Option<f64>>> {
    let mut highest = Maximum::new(WINDOW)
        .map_err(|e| InsightError::InvalidInput(format!("KDJ window: {e}")))?;
    let mut lowest = Minimum::new(WINDOW)
        .map_err(|e| InsightError::InvalidInput(format!("KDJ window: {e}")))?;

    Ok(highs
        .iter()
        .zip(lows)
        .zip(closes)
        .enumerate()
        .map(|(i, ((&high, &low), &close))| {
            let high_max = highest.next(high);
            let low_min = lowest.next(low);
            let range = high_max - low_min;
            if i + 1 < WINDOW || range == 0.0 || !range.is_finite() {
                None
            } else {
                Some((close - low_min) / range * 100.0)
            }
        })
        .collect())
}

/// KDJ over high/low/close series of equal length.
///
/// K and D are smoothed with weights 2/3 and 1/3 and seeded at 50 whenever
/// the previous bar had no value; `J = 3K − 2D`.
pub fn kdj(highs: &[f64], lows: &[f64], closes: &[f64]) -> Result<Vec<KdjValues>> {
    if highs.len() != lows.len() || highs.len() != closes.len() {
        return Err(InsightError::InvalidInput(format!(
            "KDJ inputs differ in length: {} highs, {} lows, {} closes",
            highs.len(),
            lows.len(),
            closes.len()
        )));
    }

    let mut out = Vec::with_capacity(closes.len());
    let mut previous: Option<(f64, f64)> = None;

    for value in rsv(highs, lows, closes)? {
        match value {
            None => {
                previous = None;
                out.push(KdjValues::default());
            }
            Some(rsv) => {
                let (k_prev, d_prev) = previous.unwrap_or((SEED, SEED));
                let k = 2.0 / 3.0 * k_prev + 1.0 / 3.0 * rsv;
                let d = 2.0 / 3.0 * d_prev + 1.0 / 3.0 * k;
                previous = Some((k, d));
                out.push(KdjValues {
                    k: Some(k),
                    d: Some(d),
                    j: Some(3.0 * k - 2.0 * d),
                });
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn ramp(n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let closes: Vec<f64> = (0..n).map(|i| 10.0 + i as f64).collect();
        let highs = closes.iter().map(|c| c + 1.0).collect();
        let lows = closes.iter().map(|c| c - 1.0).collect();
        (highs, lows, closes)
    }

    #[test]
    fn test_undefined_until_window_full() {
        let (h, l, c) = ramp(12);
        let out = kdj(&h, &l, &c).unwrap();
        assert_eq!(out.len(), 12);
        assert!(out[..WINDOW - 1].iter().all(|v| v.k.is_none() && v.d.is_none() && v.j.is_none()));
        assert!(out[WINDOW - 1..].iter().all(|v| v.k.is_some()));
    }

    #[test]
    fn test_first_value_seeded_from_fifty() {
        let (h, l, c) = ramp(9);
        let out = kdj(&h, &l, &c).unwrap();
        // window lows 9..17, highs 11..19 → min 9, max 19; close 18
        let rsv = (18.0 - 9.0) / (19.0 - 9.0) * 100.0;
        let k = 2.0 / 3.0 * 50.0 + rsv / 3.0;
        let d = 2.0 / 3.0 * 50.0 + k / 3.0;
        let last = out[8];
        assert!(approx(last.k.unwrap(), k));
        assert!(approx(last.d.unwrap(), d));
        assert!(approx(last.j.unwrap(), 3.0 * k - 2.0 * d));
    }

    #[test]
    fn test_flat_window_resets_seed() {
        let mut highs = vec![5.0; 9];
        let mut lows = vec![5.0; 9];
        let mut closes = vec![5.0; 9];
        // tenth bar breaks the flat range
        highs.push(7.0);
        lows.push(5.0);
        closes.push(6.0);

        let out = kdj(&highs, &lows, &closes).unwrap();
        assert!(out[8].k.is_none());
        let rsv = (6.0 - 5.0) / (7.0 - 5.0) * 100.0;
        assert!(approx(out[9].k.unwrap(), 2.0 / 3.0 * 50.0 + rsv / 3.0));
    }

    #[test]
    fn test_length_mismatch() {
        let result = kdj(&[1.0, 2.0], &[1.0], &[1.0, 2.0]);
        assert!(matches!(result, Err(InsightError::InvalidInput(_))));
    }

    #[test]
    fn test_values_stay_bounded_for_k_and_d() {
        let (h, l, c) = ramp(40);
        let out = kdj(&h, &l, &c).unwrap();
        for v in out.iter().filter_map(|v| v.k.zip(v.d)) {
            assert!((0.0..=100.0).contains(&v.0));
            assert!((0.0..=100.0).contains(&v.1));
        }
    }
}
