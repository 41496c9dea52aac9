//! Error types for stock insight operations

use thiserror::Error;

/// Stock insight specific errors
#[derive(Debug, Error)]
pub enum InsightError {
    /// Ticker or code could not be resolved to a symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// A request parameter is out of range
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Rate limit exceeded for a provider
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Upstream API answered with an error
    #[error("API error from {provider} (status {status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Excel report generation error
    #[error("Report error: {0}")]
    ReportError(#[from] rust_xlsxwriter::XlsxError),

    /// Dashboard template rendering error
    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl InsightError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NetworkError(_) | Self::RateLimitExceeded { .. } => true,
            Self::ApiError { status, .. } => *status == 429 || *status >= 500,
            Self::YahooFinanceError(msg) => {
                let msg = msg.to_ascii_lowercase();
                msg.contains("connection")
                    || msg.contains("timeout")
                    || msg.contains("too many requests")
                    || msg.contains("fetch failed")
            }
            _ => false,
        }
    }
}

/// Convert insight_utils::EnvError to InsightError
impl From<insight_utils::EnvError> for InsightError {
    fn from(err: insight_utils::EnvError) -> Self {
        InsightError::ConfigError(err.to_string())
    }
}

/// Result type alias for stock insight operations
pub type Result<T> = std::result::Result<T, InsightError>;
