//! Additive trend + seasonality model
//!
//! `y(t) = trend(t) + weekly(t) + yearly(t) + noise`, where the trend is
//! piecewise linear with evenly spaced changepoints and each seasonal term is a
//! truncated Fourier series. All coefficients come from one penalized least
//! squares solve on targets scaled by their largest magnitude. The band around
//! the central estimate is a normal interval on the residual spread that widens
//! past the last observation.

use crate::config::ModelConfig;
use crate::data::TrainingFrame;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastFrame, ForecastModel, ForecastRow, TrainedForecastModel};
use chrono::NaiveDateTime;
use statrs::distribution::{ContinuousCDF, Normal};
use trade_math::fourier::Seasonality;
use trade_math::{fit_penalized, stats, LeastSquaresFit};

const SECONDS_PER_DAY: f64 = 86_400.0;
const YEARLY_PERIOD_DAYS: f64 = 365.25;
const WEEKLY_PERIOD_DAYS: f64 = 7.0;
/// History needed before a yearly cycle is fitted
const YEARLY_MIN_SPAN_DAYS: f64 = 730.0;
/// History needed before a weekly cycle is fitted
const WEEKLY_MIN_SPAN_DAYS: f64 = 14.0;

/// Piecewise-linear trend with weekly and yearly seasonality
#[derive(Debug, Clone)]
pub struct AdditiveModel {
    /// Name of the model
    name: String,
    /// Fitting parameters
    config: ModelConfig,
}

/// Fitted additive model
#[derive(Debug, Clone)]
pub struct TrainedAdditiveModel {
    name: String,
    /// First training timestamp, origin of the time axis
    origin: NaiveDateTime,
    /// Training span in days; `t = days / span_days`
    span_days: f64,
    /// Divisor applied to targets before fitting
    y_scale: f64,
    /// Changepoint locations on the scaled time axis
    changepoints: Vec<f64>,
    seasonalities: Vec<Seasonality>,
    fit: LeastSquaresFit,
    /// Residual standard deviation in price units
    sigma: f64,
    /// Normal quantile of the interval width
    z: f64,
    history: Vec<NaiveDateTime>,
}

impl AdditiveModel {
    /// Create a new additive model
    pub fn new(config: ModelConfig) -> Result<Self> {
        config.validate().map_err(|e| {
            ForecastError::InvalidParameter(format!("additive model settings: {}", e))
        })?;

        Ok(Self {
            name: format!(
                "Additive trend/seasonality (interval={:.2})",
                config.interval_width
            ),
            config,
        })
    }

    fn seasonalities_for(&self, span_days: f64) -> Result<Vec<Seasonality>> {
        let mut out = Vec::new();
        if self.config.weekly_order > 0 && span_days >= WEEKLY_MIN_SPAN_DAYS {
            out.push(Seasonality::new(
                "weekly",
                WEEKLY_PERIOD_DAYS,
                self.config.weekly_order,
            )?);
        }
        if self.config.yearly_order > 0 && span_days >= YEARLY_MIN_SPAN_DAYS {
            out.push(Seasonality::new(
                "yearly",
                YEARLY_PERIOD_DAYS,
                self.config.yearly_order,
            )?);
        }
        Ok(out)
    }
}

impl Default for AdditiveModel {
    fn default() -> Self {
        Self {
            name: "Additive trend/seasonality (interval=0.80)".to_string(),
            config: ModelConfig::default(),
        }
    }
}

/// Evenly spaced changepoints over the first `range` share of `ts`
fn changepoint_locations(ts: &[f64], count: usize, range: f64) -> Vec<f64> {
    let hist_size = (ts.len() as f64 * range).floor() as usize;
    let count = count.min(hist_size.saturating_sub(1));
    if count == 0 {
        return Vec::new();
    }

    let last_idx = (hist_size - 1) as f64;
    (1..=count)
        .map(|i| {
            let idx = (i as f64 * last_idx / count as f64).round() as usize;
            ts[idx]
        })
        .collect()
}

fn days_between(origin: NaiveDateTime, ds: NaiveDateTime) -> f64 {
    (ds - origin).num_seconds() as f64 / SECONDS_PER_DAY
}

impl TrainedAdditiveModel {
    fn trend_width(&self) -> usize {
        2 + self.changepoints.len()
    }

    fn design_row(&self, ds: NaiveDateTime) -> Vec<f64> {
        let days = days_between(self.origin, ds);
        let t = days / self.span_days;

        let mut row = Vec::with_capacity(self.fit.coefficients.len());
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|&c| (t - c).max(0.0)));
        for seasonality in &self.seasonalities {
            row.extend(seasonality.features(days));
        }
        row
    }

    /// Band half-width at `days` after the origin
    fn half_width(&self, days: f64) -> f64 {
        let past_end = (days - self.span_days).max(0.0);
        self.z * self.sigma * (1.0 + past_end / self.span_days).sqrt()
    }
}

impl ForecastModel for AdditiveModel {
    type Trained = TrainedAdditiveModel;

    fn train(&self, data: &TrainingFrame) -> Result<Self::Trained> {
        if data.len() < 2 {
            return Err(ForecastError::InsufficientData(data.len()));
        }

        let history = data.timestamps();
        let values = data.values();
        let origin = history[0];
        let span_days = days_between(origin, history[history.len() - 1]);
        if span_days <= 0.0 {
            return Err(ForecastError::ForecastingError(
                "Training timestamps must span a positive interval".to_string(),
            ));
        }

        let y_scale = match stats::max_abs(&values)? {
            s if s > 0.0 => s,
            _ => 1.0,
        };
        let scaled: Vec<f64> = values.iter().map(|v| v / y_scale).collect();

        let ts: Vec<f64> = history
            .iter()
            .map(|&ds| days_between(origin, ds) / span_days)
            .collect();
        let changepoints =
            changepoint_locations(&ts, self.config.n_changepoints, self.config.changepoint_range);
        let seasonalities = self.seasonalities_for(span_days)?;

        let mut penalties = vec![0.0, 0.0];
        penalties.extend(std::iter::repeat(1.0 / self.config.changepoint_prior_scale).take(changepoints.len()));
        for seasonality in &seasonalities {
            penalties.extend(
                std::iter::repeat(1.0 / self.config.seasonality_prior_scale)
                    .take(seasonality.width()),
            );
        }

        let mut trained = TrainedAdditiveModel {
            name: self.name.clone(),
            origin,
            span_days,
            y_scale,
            changepoints,
            seasonalities,
            fit: LeastSquaresFit {
                coefficients: vec![0.0; penalties.len()],
                residuals: Vec::new(),
            },
            sigma: 0.0,
            z: 0.0,
            history,
        };

        let rows: Vec<Vec<f64>> = trained
            .history
            .iter()
            .map(|&ds| trained.design_row(ds))
            .collect();
        trained.fit = fit_penalized(&rows, &scaled, &penalties)?;
        trained.sigma = stats::std_dev(&trained.fit.residuals)? * y_scale;

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::ForecastingError(e.to_string()))?;
        trained.z = normal.inverse_cdf(0.5 + self.config.interval_width / 2.0);

        log::info!(
            "{}: {} rows, {} changepoints, seasonalities {:?}, sigma {:.4}",
            self.name,
            trained.history.len(),
            trained.changepoints.len(),
            trained
                .seasonalities
                .iter()
                .map(Seasonality::name)
                .collect::<Vec<_>>(),
            trained.sigma
        );

        Ok(trained)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedAdditiveModel {
    fn history(&self) -> &[NaiveDateTime] {
        &self.history
    }

    fn predict(&self, timestamps: &[NaiveDateTime]) -> Result<ForecastFrame> {
        let trend_width = self.trend_width();

        let rows = timestamps
            .iter()
            .map(|&ds| {
                let x = self.design_row(ds);
                let trend = self.fit.evaluate(&x, 0..trend_width) * self.y_scale;

                let mut offset = trend_width;
                let seasonal: Vec<f64> = self
                    .seasonalities
                    .iter()
                    .map(|s| {
                        let range = offset..offset + s.width();
                        offset += s.width();
                        self.fit.evaluate(&x, range) * self.y_scale
                    })
                    .collect();

                let yhat = trend + seasonal.iter().sum::<f64>();
                let half = self.half_width(days_between(self.origin, ds));
                ForecastRow {
                    ds,
                    trend,
                    seasonal,
                    yhat,
                    yhat_lower: yhat - half,
                    yhat_upper: yhat + half,
                }
            })
            .collect();

        let names = self
            .seasonalities
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        ForecastFrame::new(names, rows)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
