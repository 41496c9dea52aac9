//! Trading hints derived from the latest indicator values

use serde::{Deserialize, Serialize};

use crate::indicators::{KdjValues, MacdValues};

const OVERSOLD: f64 = 20.0;
const OVERBOUGHT: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// DIF above DEA with a positive histogram
    MacdBullish,
    /// DIF below DEA with a negative histogram
    MacdBearish,
    /// J below 20
    KdjOversold,
    /// J above 80
    KdjOverbought,
}

impl Signal {
    /// Bilingual label for dashboards and reports
    pub fn label(self) -> &'static str {
        match self {
            Signal::MacdBullish => "MACD金叉/上涨动能 (bullish momentum)",
            Signal::MacdBearish => "MACD死叉/下跌动能 (bearish momentum)",
            Signal::KdjOversold => "KDJ超卖区 (oversold)",
            Signal::KdjOverbought => "KDJ超买区 (overbought)",
        }
    }

    pub fn is_bullish(self) -> bool {
        matches!(self, Signal::MacdBullish | Signal::KdjOversold)
    }
}

/// Evaluate signals on the most recent bar
pub fn detect(macd: Option<&MacdValues>, kdj: Option<&KdjValues>) -> Vec<Signal> {
    let mut signals = Vec::new();

    if let Some(m) = macd {
        if m.dif > m.dea && m.histogram > 0.0 {
            signals.push(Signal::MacdBullish);
        } else if m.dif < m.dea && m.histogram < 0.0 {
            signals.push(Signal::MacdBearish);
        }
    }

    if let Some(j) = kdj.and_then(|v| v.j) {
        if j < OVERSOLD {
            signals.push(Signal::KdjOversold);
        } else if j > OVERBOUGHT {
            signals.push(Signal::KdjOverbought);
        }
    }

    signals
}
