//! Daily price series and the frames derived from them

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Name of the timestamp column a forecaster fits against
pub const TIMESTAMP_COLUMN: &str = "ds";
/// Name of the target value column a forecaster fits against
pub const TARGET_COLUMN: &str = "y";

/// Days between 0001-01-01 and 1970-01-01
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// One trading day of OHLCV data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    /// Session date, with the UTC offset the source reported for it
    pub date: DateTime<FixedOffset>,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume
    pub volume: u64,
}

impl DailyBar {
    /// Calendar date of the session in the exchange's own offset
    pub fn calendar_date(&self) -> NaiveDate {
        self.date.naive_local().date()
    }
}

/// Ordered daily bars for one ticker
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    /// Symbol the bars belong to
    ticker: String,
    /// Bars ordered by strictly increasing calendar date
    bars: Vec<DailyBar>,
}

impl RawSeries {
    /// Create a series, rejecting out-of-order or duplicate dates
    pub fn new(ticker: &str, bars: Vec<DailyBar>) -> Result<Self> {
        if let Some(pair) = bars
            .windows(2)
            .find(|pair| pair[0].calendar_date() >= pair[1].calendar_date())
        {
            return Err(ForecastError::DataError(format!(
                "Dates must be strictly increasing: {} is followed by {}",
                pair[0].calendar_date(),
                pair[1].calendar_date()
            )));
        }

        Ok(Self {
            ticker: ticker.to_string(),
            bars,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(DailyBar::calendar_date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(DailyBar::calendar_date)
    }

    /// Calendar dates of every bar
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(DailyBar::calendar_date).collect()
    }

    /// Get the open prices as a vector
    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    /// Get the close prices as a vector
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// The last `n` bars (fewer when the series is shorter)
    pub fn tail(&self, n: usize) -> &[DailyBar] {
        &self.bars[self.bars.len().saturating_sub(n)..]
    }

    /// Tabular view with the date index turned into an explicit `Date` column
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let dates: Vec<i32> = self
            .bars
            .iter()
            .map(|b| b.calendar_date().num_days_from_ce() - EPOCH_DAYS_FROM_CE)
            .collect();

        let df = DataFrame::new(vec![
            Series::new("Date", dates).cast(&DataType::Date)?,
            Series::new("Open", self.opens()),
            Series::new("High", self.bars.iter().map(|b| b.high).collect::<Vec<f64>>()),
            Series::new("Low", self.bars.iter().map(|b| b.low).collect::<Vec<f64>>()),
            Series::new("Close", self.closes()),
            Series::new("Volume", self.bars.iter().map(|b| b.volume).collect::<Vec<u64>>()),
        ])?;

        Ok(df)
    }
}

/// One observation handed to a forecaster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingRow {
    /// Naive wall-clock timestamp
    pub ds: NaiveDateTime,
    /// Target value (the close price)
    pub y: f64,
}

/// The two-column `(ds, y)` dataset a forecaster is fitted on
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrainingFrame {
    rows: Vec<TrainingRow>,
}

impl TrainingFrame {
    pub fn new(rows: Vec<TrainingRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TrainingRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.rows.iter().map(|r| r.ds).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.y).collect()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.rows.first().map(|r| r.ds)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.rows.last().map(|r| r.ds)
    }

    /// Exactly two columns, `ds` then `y`
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let millis: Vec<i64> = self
            .rows
            .iter()
            .map(|r| r.ds.and_utc().timestamp_millis())
            .collect();

        let df = DataFrame::new(vec![
            Series::new(TIMESTAMP_COLUMN, millis)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
            Series::new(TARGET_COLUMN, self.values()),
        ])?;

        Ok(df)
    }
}

/// Number of calendar days a forecast extends past the last observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Horizon(u32);

impl Horizon {
    pub const MIN_YEARS: u32 = 1;
    pub const MAX_YEARS: u32 = 5;
    /// Fixed year length; leap days are not accounted for
    pub const DAYS_PER_YEAR: u32 = 365;

    /// `years * 365` days, for years in `1..=5`
    pub fn from_years(years: u32) -> Result<Self> {
        if !(Self::MIN_YEARS..=Self::MAX_YEARS).contains(&years) {
            return Err(ForecastError::InvalidHorizon(years));
        }
        Ok(Self(years * Self::DAYS_PER_YEAR))
    }

    /// A horizon of an arbitrary number of days
    pub fn from_days(days: u32) -> Self {
        Self(days)
    }

    pub fn days(&self) -> u32 {
        self.0
    }
}
