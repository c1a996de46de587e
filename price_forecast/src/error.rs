//! Error types for the price_forecast crate

use chrono::NaiveDate;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The market data source could not deliver bars for the symbol
    #[error("Data unavailable for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    /// The requested range is inverted or holds no trading days
    #[error("No trading days for {ticker} between {start} and {end}")]
    EmptyRange {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Too few observations to establish a trend
    #[error("Insufficient data: need at least 2 records, got {0}")]
    InsufficientData(usize),

    /// Requested forecast length outside the supported range
    #[error("Invalid horizon: {0} years is outside 1..=5")]
    InvalidHorizon(u32),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error related to forecasting operations
    #[error("Forecasting error: {0}")]
    ForecastingError(String),

    /// Error raised while producing tables or charts
    #[error("Render error: {0}")]
    RenderError(String),

    /// Error in the configuration file or overrides
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error while encoding or decoding JSON/CSV payloads
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl ForecastError {
    pub(crate) fn unavailable(ticker: &str, reason: impl Into<String>) -> Self {
        ForecastError::DataUnavailable {
            ticker: ticker.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::SerializationError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}

impl From<trade_math::MathError> for ForecastError {
    fn from(err: trade_math::MathError) -> Self {
        ForecastError::ForecastingError(err.to_string())
    }
}
