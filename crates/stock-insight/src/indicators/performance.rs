//! Price change over standard lookback windows

use serde::{Deserialize, Serialize};

/// Trading days in roughly one month
pub const MONTH_BARS: usize = 21;
/// Trading days in roughly three months
pub const QUARTER_BARS: usize = 63;

/// Headline price figures, changes in percent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Performance {
    pub latest_close: Option<f64>,
    pub change_1m: Option<f64>,
    pub change_3m: Option<f64>,
    /// Change over the whole requested window
    pub change_1y: Option<f64>,
}

fn change(latest: f64, base: f64) -> Option<f64> {
    (base != 0.0).then(|| (latest / base - 1.0) * 100.0)
}

/// Compute performance figures from closes in ascending date order
pub fn performance(closes: &[f64]) -> Performance {
    let Some(&latest) = closes.last() else {
        return Performance::default();
    };
    let n = closes.len();
    let back = |bars: usize| (n > bars).then(|| closes[n - bars]).and_then(|base| change(latest, base));

    Performance {
        latest_close: Some(latest),
        change_1m: back(MONTH_BARS),
        change_3m: back(QUARTER_BARS),
        change_1y: (n > 1).then(|| closes[0]).and_then(|base| change(latest, base)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_series() {
        assert_eq!(performance(&[]), Performance::default());
    }

    #[test]
    fn test_single_bar() {
        let p = performance(&[10.0]);
        assert_eq!(p.latest_close, Some(10.0));
        assert_eq!(p.change_1m, None);
        assert_eq!(p.change_1y, None);
    }

    #[test]
    fn test_windows_respect_length_thresholds() {
        let closes: Vec<f64> = (1..=21).map(f64::from).collect();
        let p = performance(&closes);
        assert_eq!(p.change_1m, None);
        assert_eq!(p.change_1y, Some(2000.0));

        let closes: Vec<f64> = (1..=22).map(f64::from).collect();
        let p = performance(&closes);
        // 21 bars back from index 21 is index 1, close 2.0
        assert_eq!(p.change_1m, Some(1000.0));
        assert_eq!(p.change_3m, None);
    }

    #[test]
    fn test_quarter_window() {
        let mut closes = vec![50.0; 64];
        closes[0] = 25.0;
        closes[63] = 100.0;
        let p = performance(&closes);
        assert_eq!(p.change_3m, Some(100.0));
        assert_eq!(p.change_1y, Some(300.0));
    }

    #[test]
    fn test_zero_base_is_undefined() {
        let p = performance(&[0.0, 5.0]);
        assert_eq!(p.change_1y, None);
    }
}
