//! News headline digestion
//!
//! Headlines are tallied with a small keyword lexicon covering English and
//! Chinese financial vocabulary. This is a coarse tone indicator, not a
//! language model.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::sync::LazyLock;

use crate::data::DataOrigin;

const POSITIVE: &[&str] = &[
    "beat", "beats", "surge", "surges", "soar", "soars", "rally", "rallies", "record high",
    "upgrade", "upgraded", "outperform", "growth", "profit rises", "buyback", "strong",
    "gain", "gains", "bullish", "涨", "上涨", "大涨", "增长", "利好", "突破", "新高", "增持",
    "回购", "超预期", "盈利",
];

const NEGATIVE: &[&str] = &[
    "miss", "misses", "plunge", "plunges", "slump", "slumps", "tumble", "tumbles", "downgrade",
    "downgraded", "lawsuit", "investigation", "fraud", "recall", "loss", "losses", "weak", "bearish",
    "layoff", "layoffs", "跌", "下跌", "大跌", "亏损", "利空", "减持", "处罚", "诉讼", "调查",
    "下滑", "新低",
];

static POSITIVE_TERMS: LazyLock<Lexicon> = LazyLock::new(|| Lexicon::new(POSITIVE));
static NEGATIVE_TERMS: LazyLock<Lexicon> = LazyLock::new(|| Lexicon::new(NEGATIVE));

/// Keyword matcher; English terms match whole words only, Chinese terms
/// match anywhere with the longest term winning
struct Lexicon(Regex);

impl Lexicon {
    fn new(words: &[&str]) -> Self {
        let mut words = words.to_vec();
        words.sort_by_key(|w| Reverse(w.chars().count()));
        let (english, chinese): (Vec<&str>, Vec<&str>) = words.into_iter().partition(|w| w.is_ascii());
        let alternation =
            |terms: Vec<&str>| terms.into_iter().map(regex::escape).collect::<Vec<_>>().join("|");

        let pattern = format!(r"(?i)\b(?:{})\b|(?:{})", alternation(english), alternation(chinese));
        let regex = Regex::new(&pattern).unwrap_or_else(|e| panic!("invalid lexicon regex: {e}"));
        Self(regex)
    }

    /// Non-overlapping occurrences in `text`
    fn hits(&self, text: &str) -> usize {
        self.0.find_iter(text).count()
    }
}

/// Tone of a single headline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Classify free text by counting lexicon hits; ties are neutral
    pub fn classify(text: &str) -> Self {
        let positive = POSITIVE_TERMS.hits(text);
        let negative = NEGATIVE_TERMS.hits(text);

        match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

/// A news item as returned by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub published: DateTime<Utc>,
    pub source: String,
    pub title: String,
    pub summary: String,
    pub url: String,
}

/// A headline with its classified tone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredHeadline {
    #[serde(flatten)]
    pub headline: Headline,
    pub sentiment: Sentiment,
}

/// Summary of recent news for one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsDigest {
    pub headlines: Vec<ScoredHeadline>,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub summary: String,
    pub origin: DataOrigin,
}

impl NewsDigest {
    /// Keep the `limit` most recent headlines and tally their tone
    pub fn from_headlines(mut headlines: Vec<Headline>, limit: usize, origin: DataOrigin) -> Self {
        headlines.sort_by(|a, b| b.published.cmp(&a.published));
        headlines.truncate(limit);

        let scored: Vec<ScoredHeadline> = headlines
            .into_iter()
            .map(|headline| {
                let sentiment =
                    Sentiment::classify(&format!("{} {}", headline.title, headline.summary));
                ScoredHeadline {
                    headline,
                    sentiment,
                }
            })
            .collect();

        let count = |s: Sentiment| scored.iter().filter(|h| h.sentiment == s).count();
        let positive = count(Sentiment::Positive);
        let negative = count(Sentiment::Negative);
        let neutral = count(Sentiment::Neutral);

        let summary = if scored.is_empty() {
            "No recent news".to_string()
        } else {
            format!(
                "{} articles: {positive} positive, {negative} negative, {neutral} neutral",
                scored.len()
            )
        };

        Self {
            headlines: scored,
            positive,
            negative,
            neutral,
            summary,
            origin,
        }
    }

    /// Digest used when no news provider is configured or reachable
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::from_headlines(Vec::new(), 0, DataOrigin::simulated(reason))
    }

    /// Overall tone across the kept headlines
    pub fn overall(&self) -> Sentiment {
        match self.positive.cmp(&self.negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn headline(hour: u32, title: &str) -> Headline {
        Headline {
            published: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
            source: "Wire".to_string(),
            title: title.to_string(),
            summary: String::new(),
            url: format!("https://example.com/{hour}"),
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(Sentiment::classify("Shares surge after earnings beat"), Sentiment::Positive);
        assert_eq!(Sentiment::classify("Regulator opens investigation, stock plunges"), Sentiment::Negative);
        assert_eq!(Sentiment::classify("Company holds annual meeting"), Sentiment::Neutral);
        assert_eq!(Sentiment::classify("茅台业绩超预期 股价大涨"), Sentiment::Positive);
        assert_eq!(Sentiment::classify("公司遭立案调查"), Sentiment::Negative);
    }

    #[test]
    fn test_classify_whole_words_only() {
        // "again" and "commission" must not count as "gain" and "miss"
        assert_eq!(Sentiment::classify("Shares fall again after quarterly loss"), Sentiment::Negative);
        assert_eq!(Sentiment::classify("Company wins commission approval"), Sentiment::Neutral);
        assert_eq!(Sentiment::classify("STRONG quarter, GAINS extend"), Sentiment::Positive);
    }

    #[test]
    fn test_nested_chinese_terms_count_once() {
        assert_eq!(POSITIVE_TERMS.hits("股价大涨"), 1);
        assert_eq!(NEGATIVE_TERMS.hits("先下跌后大跌"), 2);
        // one positive against one negative
        assert_eq!(Sentiment::classify("大涨后股东减持"), Sentiment::Neutral);
    }

    #[test]
    fn test_digest_keeps_most_recent() {
        let digest = NewsDigest::from_headlines(
            vec![
                headline(1, "Old news"),
                headline(5, "Shares surge"),
                headline(3, "Stock plunges"),
            ],
            2,
            DataOrigin::live("Finnhub"),
        );

        assert_eq!(digest.headlines.len(), 2);
        assert_eq!(digest.headlines[0].headline.title, "Shares surge");
        assert_eq!(digest.headlines[1].headline.title, "Stock plunges");
        assert_eq!(digest.positive, 1);
        assert_eq!(digest.negative, 1);
        assert_eq!(digest.neutral, 0);
        assert_eq!(digest.overall(), Sentiment::Neutral);
        assert_eq!(digest.summary, "2 articles: 1 positive, 1 negative, 0 neutral");
    }

    #[test]
    fn test_empty_digest() {
        let digest = NewsDigest::unavailable("no provider configured");
        assert!(digest.headlines.is_empty());
        assert_eq!(digest.summary, "No recent news");
        assert!(digest.origin.is_simulated());
    }
}
