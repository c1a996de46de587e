//! Offline source backed by one CSV file per ticker

use super::MarketDataSource;
use crate::data::DailyBar;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Reads `<dir>/<TICKER>.csv` files with a `Date,Open,High,Low,Close,Volume` header
#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CsvRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl CsvSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// File of `ticker` inside the directory; symbols that could name a path
    /// elsewhere are refused
    fn path_for(&self, ticker: &str) -> Result<PathBuf> {
        let plain = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '^' | '=');
        if ticker.is_empty() || ticker.starts_with('.') || !ticker.chars().all(plain) {
            return Err(ForecastError::unavailable(
                ticker,
                "symbol is not a plain file name",
            ));
        }
        Ok(self.dir.join(format!("{}.csv", ticker)))
    }
}

impl MarketDataSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn daily_bars(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyBar>> {
        let path = self.path_for(ticker)?;
        if !path.is_file() {
            return Err(ForecastError::unavailable(
                ticker,
                format!("no file at {}", path.display()),
            ));
        }

        let mut reader = ::csv::Reader::from_path(&path)?;
        let mut bars = Vec::new();
        for record in reader.deserialize() {
            let row: CsvRow = record?;
            let date = parse_date(&row.date)?;
            let session = date.naive_local().date();
            if session < start || session > end {
                continue;
            }
            bars.push(DailyBar {
                date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume.max(0.0).round() as u64,
            });
        }

        log::debug!("{}: read {} bars from {}", ticker, bars.len(), path.display());
        Ok(bars)
    }
}

/// `YYYY-MM-DD` (taken as UTC midnight) or RFC 3339 with an explicit offset
fn parse_date(text: &str) -> Result<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        let utc = FixedOffset::east_opt(0)
            .ok_or_else(|| ForecastError::DataError("UTC offset unavailable".to_string()))?;
        return utc
            .from_local_datetime(&date.and_time(NaiveTime::default()))
            .single()
            .ok_or_else(|| ForecastError::DataError(format!("Invalid date '{}'", text)));
    }

    DateTime::parse_from_rfc3339(text)
        .map_err(|e| ForecastError::DataError(format!("Invalid date '{}': {}", text, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_reads_and_filters_range() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("AXISBANK.NS.csv"),
            "Date,Open,High,Low,Close,Volume\n\
             2023-01-02,100.0,105.0,98.0,103.0,1000\n\
             2023-01-03,103.0,107.0,101.0,106.0,1200\n\
             2023-01-04T00:00:00+05:30,106.0,110.0,104.0,108.0,1500\n",
        )
        .unwrap();

        let source = CsvSource::new(dir.path());
        let bars = source
            .daily_bars("AXISBANK.NS", ymd(2023, 1, 3), ymd(2023, 1, 4))
            .unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 106.0);
        assert_eq!(bars[1].date.offset().local_minus_utc(), 19_800);
        assert_eq!(bars[1].volume, 1500);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let source = CsvSource::new(dir.path());
        assert!(matches!(
            source.daily_bars("HDFCBANK.NS", ymd(2023, 1, 1), ymd(2023, 2, 1)),
            Err(ForecastError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn test_ticker_cannot_leave_directory() {
        let root = tempdir().unwrap();
        let data = root.path().join("data");
        fs::create_dir(&data).unwrap();
        fs::write(
            root.path().join("secret.csv"),
            "Date,Open,High,Low,Close,Volume\n2023-01-02,1,1,1,1,1\n",
        )
        .unwrap();

        let source = CsvSource::new(&data);
        for ticker in ["../secret", "..", "a/b", "a\\b", ""] {
            assert!(
                matches!(
                    source.daily_bars(ticker, ymd(2023, 1, 1), ymd(2023, 2, 1)),
                    Err(ForecastError::DataUnavailable { .. })
                ),
                "{:?} was accepted",
                ticker
            );
        }
        assert!(source.path_for("^NSEI").is_ok());
    }

    #[test]
    fn test_bad_date_is_reported() {
        assert!(parse_date("02/01/2023").is_err());
        assert!(parse_date("2023-01-02").is_ok());
    }
}
