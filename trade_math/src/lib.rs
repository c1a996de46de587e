//! # Trade Math
//!
//! Numeric building blocks for price forecasting.
//! This crate provides the regression solver, seasonal feature generation and
//! summary statistics used by the forecasting models in `price_forecast`.

use thiserror::Error;

pub mod fourier;
pub mod regression;
pub mod stats;

pub use regression::{fit_penalized, LeastSquaresFit};

/// Errors that can occur in numeric calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;
