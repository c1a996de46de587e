//! Market data sources
//!
//! [`MarketDataSource`] is the seam between the loader and whatever vendor
//! delivers daily bars. Sources are blocking; every call performs a full
//! download and is never retried here.

use crate::config::{SourceConfig, SourceKind};
use crate::data::DailyBar;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;

pub mod csv;
pub mod yahoo;

pub use self::csv::CsvSource;
pub use self::yahoo::YahooSource;

/// A vendor of daily OHLCV bars
pub trait MarketDataSource {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Download the daily bars of `ticker` covering `[start, end]`.
    ///
    /// Implementations may return bars slightly outside the range; the loader
    /// trims them. Unknown symbols and unreachable vendors are reported as
    /// [`ForecastError::DataUnavailable`].
    fn daily_bars(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyBar>>;
}

/// Build the source selected in the configuration
pub fn from_config(config: &SourceConfig) -> Result<Box<dyn MarketDataSource>> {
    match config.kind {
        SourceKind::Yahoo => Ok(Box::new(YahooSource::new(config)?)),
        SourceKind::Csv => {
            let dir = config.csv_dir.as_ref().ok_or_else(|| {
                ForecastError::ConfigError("The csv source needs source.csv_dir".to_string())
            })?;
            Ok(Box::new(CsvSource::new(dir)))
        }
    }
}
