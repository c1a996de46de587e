//! Turning a loaded series into a forecaster's training input

use crate::data::{Horizon, RawSeries, TrainingFrame, TrainingRow};
use crate::error::{ForecastError, Result};

/// Builds the `(ds, y)` training frame and the horizon for a request
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastPreparer;

impl ForecastPreparer {
    /// Fewest observations from which a trend can be fitted
    pub const MIN_RECORDS: usize = 2;

    pub fn new() -> Self {
        Self
    }

    /// Derive the training frame and horizon from `series`.
    ///
    /// Dates lose their UTC offset (the wall-clock reading is kept), then the
    /// series is projected onto `(date, close)`, which become `ds` and `y`.
    /// The horizon is `years * 365` days. `series` is only read.
    pub fn prepare(&self, series: &RawSeries, years: u32) -> Result<(TrainingFrame, Horizon)> {
        if series.len() < Self::MIN_RECORDS {
            return Err(ForecastError::InsufficientData(series.len()));
        }
        let horizon = Horizon::from_years(years)?;

        let rows = series
            .bars()
            .iter()
            .map(|bar| TrainingRow {
                ds: bar.date.naive_local(),
                y: bar.close,
            })
            .collect();

        log::debug!(
            "Prepared {} training rows for {} with a {} day horizon",
            series.len(),
            series.ticker(),
            horizon.days()
        );

        Ok((TrainingFrame::new(rows), horizon))
    }
}
