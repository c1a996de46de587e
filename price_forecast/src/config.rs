//! Application configuration
//!
//! Every field has a default, so an empty TOML file (or none at all) yields the
//! stock setup: four NSE banking tickers, history from 2002-01-01, Yahoo as the
//! market data source.

use crate::data::Horizon;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Fixed first day of every requested history
    pub history_start: NaiveDate,
    /// The enumerated set of selectable symbols
    pub tickers: Vec<String>,
    /// Forecast length used when none is given
    pub default_years: u32,
    /// Rows shown in tail tables
    pub tail_rows: usize,
    pub model: ModelConfig,
    pub source: SourceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history_start: NaiveDate::from_ymd_opt(2002, 1, 1).unwrap_or_default(),
            tickers: ["ICICIBANK.NS", "AXISBANK.NS", "HDFCBANK.NS", "INDUSINDBK.NS"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            default_years: 1,
            tail_rows: 5,
            model: ModelConfig::default(),
            source: SourceConfig::default(),
        }
    }
}

/// Settings of the additive trend/seasonality forecaster
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Coverage of the uncertainty band, in (0, 1)
    pub interval_width: f64,
    /// Fourier order of the yearly cycle; 0 disables it
    pub yearly_order: usize,
    /// Fourier order of the weekly cycle; 0 disables it
    pub weekly_order: usize,
    /// Number of potential trend changepoints
    pub n_changepoints: usize,
    /// Share of the history in which changepoints are placed
    pub changepoint_range: f64,
    /// Larger values let the trend bend more at changepoints
    pub changepoint_prior_scale: f64,
    /// Larger values allow stronger seasonal swings
    pub seasonality_prior_scale: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            interval_width: 0.8,
            yearly_order: 10,
            weekly_order: 3,
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
        }
    }
}

/// Which market data backend to read bars from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Yahoo,
    Csv,
}

/// Market data source settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Chart endpoint root, without the trailing symbol
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Directory holding `<TICKER>.csv` files for the csv source
    pub csv_dir: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Yahoo,
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            user_agent: concat!("stock_prediction/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
            csv_dir: None,
        }
    }
}

impl AppConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Reading configuration from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.tickers.is_empty() {
            return Err(ForecastError::ConfigError(
                "At least one ticker must be configured".to_string(),
            ));
        }
        if let Some(blank) = self.tickers.iter().find(|t| t.trim().is_empty()) {
            return Err(ForecastError::ConfigError(format!(
                "Ticker symbols must not be blank: {:?}",
                blank
            )));
        }
        if !(Horizon::MIN_YEARS..=Horizon::MAX_YEARS).contains(&self.default_years) {
            return Err(ForecastError::ConfigError(format!(
                "default_years must be within {}..={}, got {}",
                Horizon::MIN_YEARS,
                Horizon::MAX_YEARS,
                self.default_years
            )));
        }
        if self.tail_rows == 0 {
            return Err(ForecastError::ConfigError(
                "tail_rows must be positive".to_string(),
            ));
        }
        if self.source.kind == SourceKind::Csv && self.source.csv_dir.is_none() {
            return Err(ForecastError::ConfigError(
                "The csv source needs source.csv_dir".to_string(),
            ));
        }
        self.model.validate()
    }

    /// Whether `ticker` belongs to the selectable set
    pub fn is_known_ticker(&self, ticker: &str) -> bool {
        self.tickers.iter().any(|t| t == ticker)
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::ConfigError(
                "model.interval_width must be between 0 and 1".to_string(),
            ));
        }
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ForecastError::ConfigError(
                "model.changepoint_range must be in (0, 1]".to_string(),
            ));
        }
        let positive = |v: f64| v > 0.0 && v.is_finite();
        if !(positive(self.changepoint_prior_scale) && positive(self.seasonality_prior_scale)) {
            return Err(ForecastError::ConfigError(
                "model prior scales must be positive and finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.tickers.len(), 4);
        assert_eq!(
            config.history_start,
            NaiveDate::from_ymd_opt(2002, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_partial_override() {
        let config = AppConfig::from_toml_str(
            r#"
            tickers = ["AXISBANK.NS"]
            default_years = 3

            [model]
            interval_width = 0.95

            [source]
            kind = "csv"
            csv_dir = "/tmp/prices"
            "#,
        )
        .unwrap();

        assert_eq!(config.tickers, vec!["AXISBANK.NS".to_string()]);
        assert_eq!(config.default_years, 3);
        assert_eq!(config.model.interval_width, 0.95);
        assert_eq!(config.model.weekly_order, 3);
        assert_eq!(config.source.kind, SourceKind::Csv);
    }

    #[test]
    fn test_validation_failures() {
        assert!(AppConfig::from_toml_str("default_years = 6").is_err());
        assert!(AppConfig::from_toml_str("tickers = []").is_err());
        assert!(AppConfig::from_toml_str("[source]\nkind = \"csv\"").is_err());
        assert!(AppConfig::from_toml_str("[model]\ninterval_width = 1.5").is_err());
        assert!(AppConfig::from_toml_str("[model]\ninterval_width = nan").is_err());
        assert!(AppConfig::from_toml_str("[model]\nchangepoint_range = nan").is_err());
        assert!(AppConfig::from_toml_str("[model]\nchangepoint_prior_scale = nan").is_err());
        assert!(AppConfig::from_toml_str("[model]\nseasonality_prior_scale = inf").is_err());
        assert!(matches!(
            AppConfig::from_toml_str("unknown_key = 1"),
            Err(ForecastError::ConfigError(_))
        ));
    }
}
