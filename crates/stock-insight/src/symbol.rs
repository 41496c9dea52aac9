//! Ticker and A-share code resolution
//!
//! Users type either a six-digit mainland code (`600519`), a four or five
//! digit Hong Kong code (`0700`, `00700`) or a plain ticker (`AAPL`). Everything downstream works on
//! the Yahoo-style market-qualified form (`600519.SS`, `0700.HK`, `AAPL`).

use crate::error::{InsightError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

const MAX_INPUT_LEN: usize = 10;

static ALLOWED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.\-^=]+$").unwrap_or_else(|e| panic!("invalid symbol regex: {e}"))
});

/// Exchange a symbol trades on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    Shanghai,
    Shenzhen,
    Beijing,
    HongKong,
    Global,
}

impl Market {
    /// Yahoo suffix for the market, if any
    pub fn suffix(self) -> Option<&'static str> {
        match self {
            Market::Shanghai => Some("SS"),
            Market::Shenzhen => Some("SZ"),
            Market::Beijing => Some("BJ"),
            Market::HongKong => Some("HK"),
            Market::Global => None,
        }
    }

    fn from_suffix(suffix: &str) -> Self {
        match suffix {
            "SS" | "SH" => Market::Shanghai,
            "SZ" => Market::Shenzhen,
            "BJ" => Market::Beijing,
            "HK" => Market::HongKong,
            _ => Market::Global,
        }
    }

    /// Whether this is a mainland China exchange
    pub fn is_a_share(self) -> bool {
        matches!(self, Market::Shanghai | Market::Shenzhen | Market::Beijing)
    }
}

/// A resolved, market-qualified symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    /// What the user typed, trimmed
    pub input: String,
    /// Yahoo-style qualified ticker
    pub yahoo: String,
    /// Exchange
    pub market: Market,
}

impl Symbol {
    /// Resolve user input into a symbol
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(InsightError::InvalidSymbol("empty code".to_string()));
        }
        if input.chars().count() > MAX_INPUT_LEN {
            return Err(InsightError::InvalidSymbol(format!(
                "{input} is longer than {MAX_INPUT_LEN} characters"
            )));
        }
        if !ALLOWED.is_match(input) {
            return Err(InsightError::InvalidSymbol(format!(
                "{input} contains unsupported characters"
            )));
        }

        let upper = input.to_ascii_uppercase();

        if let Some((base, suffix)) = upper.rsplit_once('.') {
            if base.is_empty() || suffix.is_empty() {
                return Err(InsightError::InvalidSymbol(input.to_string()));
            }
            let market = Market::from_suffix(suffix);
            // Yahoo uses SS for Shanghai; accept the common SH spelling too
            let yahoo = match market {
                Market::Shanghai => format!("{base}.SS"),
                _ => upper.clone(),
            };
            return Ok(Self {
                input: input.to_string(),
                yahoo,
                market,
            });
        }

        let all_digits = upper.chars().all(|c| c.is_ascii_digit());

        let a_share = if all_digits && upper.len() == 6 {
            a_share_market(&upper)
        } else {
            None
        };

        // unknown six-digit prefixes and shorter numbers pass through untouched
        let (yahoo, market) = match a_share {
            Some(market) => (format!("{upper}.{}", market.suffix().unwrap_or_default()), market),
            None if all_digits && (4..=5).contains(&upper.len()) => {
                (format!("{}.HK", hong_kong_code(&upper)), Market::HongKong)
            }
            None => (upper.clone(), Market::Global),
        };

        Ok(Self {
            input: input.to_string(),
            yahoo,
            market,
        })
    }

    /// Code without the market suffix
    pub fn code(&self) -> &str {
        self.yahoo
            .rsplit_once('.')
            .map_or(self.yahoo.as_str(), |(base, _)| base)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.yahoo)
    }
}

fn a_share_market(code: &str) -> Option<Market> {
    match code.as_bytes().first()? {
        b'6' | b'9' | b'5' => Some(Market::Shanghai),
        b'0' | b'1' | b'2' | b'3' => Some(Market::Shenzhen),
        b'4' | b'8' => Some(Market::Beijing),
        _ => None,
    }
}

/// Yahoo lists Hong Kong codes with exactly four digits
fn hong_kong_code(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    format!("{trimmed:0>4}")
}
