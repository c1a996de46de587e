//! Forecasting models for daily price series

use crate::data::{Horizon, TrainingFrame, TIMESTAMP_COLUMN};
use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDateTime};
use polars::prelude::*;
use serde::Serialize;
use std::fmt::Debug;

pub mod additive;

pub use additive::{AdditiveModel, TrainedAdditiveModel};

/// One forecast row: central estimate, band and its additive parts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub ds: NaiveDateTime,
    pub trend: f64,
    /// Seasonal contributions, aligned with [`ForecastFrame::component_names`]
    pub seasonal: Vec<f64>,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// Forecast covering the training period followed by the horizon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastFrame {
    /// Names of the seasonal components (e.g. `weekly`, `yearly`)
    component_names: Vec<String>,
    /// Rows ordered by timestamp
    rows: Vec<ForecastRow>,
}

impl ForecastFrame {
    /// Create a frame, checking row order and component arity
    pub fn new(component_names: Vec<String>, rows: Vec<ForecastRow>) -> Result<Self> {
        if let Some(row) = rows
            .iter()
            .find(|r| r.seasonal.len() != component_names.len())
        {
            return Err(ForecastError::ForecastingError(format!(
                "Row at {} has {} seasonal values, expected {}",
                row.ds,
                row.seasonal.len(),
                component_names.len()
            )));
        }
        if rows.windows(2).any(|w| w[0].ds >= w[1].ds) {
            return Err(ForecastError::ForecastingError(
                "Forecast rows must be strictly increasing in time".to_string(),
            ));
        }

        Ok(Self {
            component_names,
            rows,
        })
    }

    pub fn component_names(&self) -> &[String] {
        &self.component_names
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDateTime> {
        self.rows.first().map(|r| r.ds)
    }

    pub fn last_date(&self) -> Option<NaiveDateTime> {
        self.rows.last().map(|r| r.ds)
    }

    pub fn tail(&self, n: usize) -> &[ForecastRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.rows.iter().map(|r| r.ds).collect()
    }

    pub fn yhat(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.yhat).collect()
    }

    pub fn trend(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.trend).collect()
    }

    /// Values of one seasonal component, by name
    pub fn component(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.component_names.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| r.seasonal[idx]).collect())
    }

    /// Columns `ds, trend, <components...>, yhat_lower, yhat_upper, yhat`
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let millis: Vec<i64> = self
            .rows
            .iter()
            .map(|r| r.ds.and_utc().timestamp_millis())
            .collect();

        let mut columns = vec![
            Series::new(TIMESTAMP_COLUMN, millis)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
            Series::new("trend", self.trend()),
        ];
        for (idx, name) in self.component_names.iter().enumerate() {
            let values: Vec<f64> = self.rows.iter().map(|r| r.seasonal[idx]).collect();
            columns.push(Series::new(name.as_str(), values));
        }
        columns.push(Series::new(
            "yhat_lower",
            self.rows.iter().map(|r| r.yhat_lower).collect::<Vec<f64>>(),
        ));
        columns.push(Series::new(
            "yhat_upper",
            self.rows.iter().map(|r| r.yhat_upper).collect::<Vec<f64>>(),
        ));
        columns.push(Series::new("yhat", self.yhat()));

        Ok(DataFrame::new(columns)?)
    }
}

/// Training timestamps followed by one timestamp per day of the horizon
pub fn future_timestamps(history: &[NaiveDateTime], horizon: Horizon) -> Vec<NaiveDateTime> {
    let mut out = Vec::with_capacity(history.len() + horizon.days() as usize);
    out.extend_from_slice(history);
    if let Some(&last) = history.last() {
        out.extend((1..=i64::from(horizon.days())).map(|k| last + Duration::days(k)));
    }
    out
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Timestamps the model was fitted on
    fn history(&self) -> &[NaiveDateTime];

    /// Predict every timestamp in `timestamps`
    fn predict(&self, timestamps: &[NaiveDateTime]) -> Result<ForecastFrame>;

    /// Name of the model
    fn name(&self) -> &str;

    /// History timestamps followed by `horizon` daily timestamps
    fn future_dates(&self, horizon: Horizon) -> Vec<NaiveDateTime> {
        future_timestamps(self.history(), horizon)
    }

    /// Predict the history plus `horizon` days beyond it
    fn forecast(&self, horizon: Horizon) -> Result<ForecastFrame> {
        self.predict(&self.future_dates(horizon))
    }
}

/// Forecast model that can be trained on a training frame
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a `(ds, y)` frame
    fn train(&self, data: &TrainingFrame) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Anything that turns a training frame and a horizon into a forecast.
///
/// The request pipeline only depends on this trait, so any backend with the
/// same input and output can be plugged in.
pub trait Forecaster {
    fn name(&self) -> &str;

    fn forecast(&self, data: &TrainingFrame, horizon: Horizon) -> Result<ForecastFrame>;
}

impl<M: ForecastModel> Forecaster for M {
    fn name(&self) -> &str {
        ForecastModel::name(self)
    }

    fn forecast(&self, data: &TrainingFrame, horizon: Horizon) -> Result<ForecastFrame> {
        let trained = self.train(data)?;
        log::debug!(
            "Trained {} on {} rows",
            TrainedForecastModel::name(&trained),
            data.len()
        );
        TrainedForecastModel::forecast(&trained, horizon)
    }
}
