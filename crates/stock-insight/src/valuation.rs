//! Valuation interpretation helpers

use crate::data::ValuationMetrics;

/// Interpret P/E ratio
pub fn interpret_pe(pe: f64) -> &'static str {
    if pe < 0.0 {
        "Negative (company is not profitable)"
    } else if pe < 15.0 {
        "Low (potentially undervalued or slow growth)"
    } else if pe < 25.0 {
        "Moderate (fairly valued)"
    } else if pe < 50.0 {
        "High (potentially overvalued or high growth)"
    } else {
        "Very High (very expensive or very high growth expectations)"
    }
}

/// P/E premium over the industry average, in percent
pub fn pe_vs_industry(metrics: &ValuationMetrics) -> Option<f64> {
    let pe = metrics.pe_ttm?;
    let industry = metrics.industry_avg_pe?;
    (industry > 0.0).then(|| (pe / industry - 1.0) * 100.0)
}

/// Format an optional metric for display, `—` when missing
pub fn format_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "—".to_string(), |v| format!("{v:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataOrigin;

    #[test]
    fn test_interpret_pe() {
        assert!(interpret_pe(-5.0).contains("Negative"));
        assert!(interpret_pe(10.0).contains("Low"));
        assert!(interpret_pe(20.0).contains("Moderate"));
        assert!(interpret_pe(35.0).contains("High"));
        assert!(interpret_pe(75.0).contains("Very High"));
    }

    #[test]
    fn test_pe_vs_industry() {
        let metrics = ValuationMetrics {
            pe_ttm: Some(30.0),
            industry_avg_pe: Some(20.0),
            ..ValuationMetrics::empty(DataOrigin::live("test"))
        };
        assert_eq!(pe_vs_industry(&metrics), Some(50.0));

        let missing = ValuationMetrics::empty(DataOrigin::live("test"));
        assert_eq!(pe_vs_industry(&missing), None);
    }

    #[test]
    fn test_format_metric() {
        assert_eq!(format_metric(Some(12.346)), "12.35");
        assert_eq!(format_metric(None), "—");
    }
}
