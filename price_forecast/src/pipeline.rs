//! One forecast request, end to end
//!
//! [`StockApp`] wires the loader, the preparer, a [`Forecaster`] and a
//! [`Renderer`] together. It owns the loader, so the series memo survives
//! across requests for as long as the app does.

use crate::config::AppConfig;
use crate::data::Horizon;
use crate::error::{ForecastError, Result};
use crate::loader::SeriesLoader;
use crate::models::Forecaster;
use crate::prepare::ForecastPreparer;
use crate::render::Renderer;
use chrono::{NaiveDate, NaiveDateTime};

/// User selection for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    pub ticker: String,
    /// Forecast length in years, 1 to 5
    pub years: u32,
    /// Last day of history to load
    pub end: NaiveDate,
}

impl ForecastRequest {
    pub fn new(ticker: &str, years: u32, end: NaiveDate) -> Self {
        Self {
            ticker: ticker.to_string(),
            years,
            end,
        }
    }
}

/// What a successful run produced
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSummary {
    pub ticker: String,
    /// Daily bars used for training
    pub observations: usize,
    pub horizon: Horizon,
    /// First training timestamp
    pub first_date: NaiveDateTime,
    /// Last forecast timestamp
    pub last_date: NaiveDateTime,
}

/// Stock forecasting application
pub struct StockApp {
    config: AppConfig,
    loader: SeriesLoader,
    preparer: ForecastPreparer,
    forecaster: Box<dyn Forecaster>,
    renderer: Box<dyn Renderer>,
}

impl StockApp {
    pub fn new(
        config: AppConfig,
        loader: SeriesLoader,
        forecaster: Box<dyn Forecaster>,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        Self {
            config,
            loader,
            preparer: ForecastPreparer::new(),
            forecaster,
            renderer,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn loader(&self) -> &SeriesLoader {
        &self.loader
    }

    /// Run one request, rendering every section in order.
    ///
    /// A failure is shown through [`Renderer::error`] in place of the
    /// remaining sections and then returned.
    pub fn run(&mut self, request: &ForecastRequest) -> Result<ForecastSummary> {
        match self.render_request(request) {
            Ok(summary) => Ok(summary),
            Err(err) => {
                log::error!("Request for {} failed: {}", request.ticker, err);
                if let Err(render_err) = self.renderer.error(&err) {
                    log::warn!("Could not render error: {}", render_err);
                }
                Err(err)
            }
        }
    }

    fn render_request(&mut self, request: &ForecastRequest) -> Result<ForecastSummary> {
        if !self.config.is_known_ticker(&request.ticker) {
            return Err(ForecastError::InvalidParameter(format!(
                "Unknown ticker '{}', choose one of: {}",
                request.ticker,
                self.config.tickers.join(", ")
            )));
        }
        // reject a bad horizon before spending a download on it
        Horizon::from_years(request.years)?;

        let ticker = request.ticker.as_str();
        let rows = self.config.tail_rows;

        self.renderer.title("Stock Prediction App")?;
        self.renderer.section(2, &format!("Data for {}", ticker))?;

        let series = self
            .loader
            .load(ticker, self.config.history_start, request.end)?;

        self.renderer.section(3, "Raw Data")?;
        self.renderer.raw_table(&series, rows)?;
        self.renderer.section(3, "Historical plot")?;
        self.renderer.raw_chart(&series)?;

        let (training, horizon) = self.preparer.prepare(&series, request.years)?;
        log::info!(
            "Forecasting {} over {} days with {}",
            ticker,
            horizon.days(),
            self.forecaster.name()
        );
        let forecast = self.forecaster.forecast(&training, horizon)?;

        self.renderer
            .section(2, &format!("Forecast data for {}", ticker))?;
        self.renderer.section(3, "Forecast rows")?;
        self.renderer.forecast_table(&forecast, rows)?;
        self.renderer.section(3, "Forecast plot")?;
        self.renderer.forecast_chart(&training, &forecast)?;
        self.renderer.section(3, "Forecast components")?;
        self.renderer.components_chart(&forecast)?;

        let (first_date, last_date) = match (forecast.first_date(), forecast.last_date()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(ForecastError::ForecastingError(
                    "Forecaster returned no rows".to_string(),
                ))
            }
        };

        Ok(ForecastSummary {
            ticker: ticker.to_string(),
            observations: training.len(),
            horizon,
            first_date,
            last_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DailyBar, TrainingFrame};
    use crate::models::{ForecastFrame, ForecastRow};
    use crate::render::ConsoleRenderer;
    use crate::source::MarketDataSource;
    use chrono::{Duration, FixedOffset, TimeZone};

    struct Flat;

    impl MarketDataSource for Flat {
        fn name(&self) -> &str {
            "flat"
        }

        fn daily_bars(&self, _: &str, start: NaiveDate, _: NaiveDate) -> Result<Vec<DailyBar>> {
            let utc = FixedOffset::east_opt(0).unwrap();
            Ok((0..10)
                .map(|k| {
                    let day = start + Duration::days(k);
                    DailyBar {
                        date: utc
                            .from_local_datetime(&day.and_hms_opt(0, 0, 0).unwrap())
                            .unwrap(),
                        open: 10.0,
                        high: 10.0,
                        low: 10.0,
                        close: 10.0,
                        volume: 1,
                    }
                })
                .collect())
        }
    }

    /// Repeats the last observation over the horizon
    struct Naive;

    impl Forecaster for Naive {
        fn name(&self) -> &str {
            "naive"
        }

        fn forecast(&self, data: &TrainingFrame, horizon: Horizon) -> Result<ForecastFrame> {
            let last = data.values().last().copied().unwrap_or_default();
            let rows = crate::models::future_timestamps(&data.timestamps(), horizon)
                .into_iter()
                .map(|ds| ForecastRow {
                    ds,
                    trend: last,
                    seasonal: vec![],
                    yhat: last,
                    yhat_lower: last,
                    yhat_upper: last,
                })
                .collect();
            ForecastFrame::new(vec![], rows)
        }
    }

    fn app() -> StockApp {
        StockApp::new(
            AppConfig::default(),
            SeriesLoader::new(Box::new(Flat)),
            Box::new(Naive),
            Box::new(ConsoleRenderer::new(Vec::new())),
        )
    }

    #[test]
    fn test_run_reports_summary() {
        let mut app = app();
        let end = NaiveDate::from_ymd_opt(2002, 1, 31).unwrap();
        let summary = app
            .run(&ForecastRequest::new("ICICIBANK.NS", 1, end))
            .unwrap();

        assert_eq!(summary.observations, 10);
        assert_eq!(summary.horizon.days(), 365);
        assert_eq!(
            summary.last_date - summary.first_date,
            Duration::days(9 + 365)
        );
        assert_eq!(app.loader().cached_len(), 1);
    }

    #[test]
    fn test_unknown_ticker_rejected_without_download() {
        let mut app = app();
        let end = NaiveDate::from_ymd_opt(2002, 1, 31).unwrap();
        let err = app.run(&ForecastRequest::new("TSLA", 1, end)).unwrap_err();

        assert!(matches!(err, ForecastError::InvalidParameter(_)));
        assert_eq!(app.loader().cached_len(), 0);
    }
}
