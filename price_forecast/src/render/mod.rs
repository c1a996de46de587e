//! Output of tables and charts
//!
//! [`Renderer`] is the seam between the request pipeline and whatever draws
//! its results. Two backends ship with the crate: [`ConsoleRenderer`] for a
//! terminal and [`FigureRenderer`] for Plotly JSON figures on disk. A tuple of
//! two renderers forwards every call to both.

use crate::data::{RawSeries, TrainingFrame};
use crate::error::{ForecastError, Result};
use crate::models::ForecastFrame;

pub mod console;
pub mod figure;

pub use console::ConsoleRenderer;
pub use figure::FigureRenderer;

/// Consumer of the pipeline's tables and charts
pub trait Renderer {
    /// Page title
    fn title(&mut self, text: &str) -> Result<()>;

    /// Section heading; `level` 2 for sections, 3 for subsections
    fn section(&mut self, level: usize, text: &str) -> Result<()>;

    /// Last `rows` bars of the loaded series
    fn raw_table(&mut self, series: &RawSeries, rows: usize) -> Result<()>;

    /// Open and close prices over time
    fn raw_chart(&mut self, series: &RawSeries) -> Result<()>;

    /// Last `rows` rows of the forecast
    fn forecast_table(&mut self, forecast: &ForecastFrame, rows: usize) -> Result<()>;

    /// Observations, central estimate and uncertainty band
    fn forecast_chart(&mut self, history: &TrainingFrame, forecast: &ForecastFrame) -> Result<()>;

    /// Trend and seasonal components of the forecast
    fn components_chart(&mut self, forecast: &ForecastFrame) -> Result<()>;

    /// A failure shown in place of the output that could not be produced
    fn error(&mut self, err: &ForecastError) -> Result<()>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn title(&mut self, text: &str) -> Result<()> {
        (**self).title(text)
    }

    fn section(&mut self, level: usize, text: &str) -> Result<()> {
        (**self).section(level, text)
    }

    fn raw_table(&mut self, series: &RawSeries, rows: usize) -> Result<()> {
        (**self).raw_table(series, rows)
    }

    fn raw_chart(&mut self, series: &RawSeries) -> Result<()> {
        (**self).raw_chart(series)
    }

    fn forecast_table(&mut self, forecast: &ForecastFrame, rows: usize) -> Result<()> {
        (**self).forecast_table(forecast, rows)
    }

    fn forecast_chart(&mut self, history: &TrainingFrame, forecast: &ForecastFrame) -> Result<()> {
        (**self).forecast_chart(history, forecast)
    }

    fn components_chart(&mut self, forecast: &ForecastFrame) -> Result<()> {
        (**self).components_chart(forecast)
    }

    fn error(&mut self, err: &ForecastError) -> Result<()> {
        (**self).error(err)
    }
}

impl<A: Renderer, B: Renderer> Renderer for (A, B) {
    fn title(&mut self, text: &str) -> Result<()> {
        self.0.title(text)?;
        self.1.title(text)
    }

    fn section(&mut self, level: usize, text: &str) -> Result<()> {
        self.0.section(level, text)?;
        self.1.section(level, text)
    }

    fn raw_table(&mut self, series: &RawSeries, rows: usize) -> Result<()> {
        self.0.raw_table(series, rows)?;
        self.1.raw_table(series, rows)
    }

    fn raw_chart(&mut self, series: &RawSeries) -> Result<()> {
        self.0.raw_chart(series)?;
        self.1.raw_chart(series)
    }

    fn forecast_table(&mut self, forecast: &ForecastFrame, rows: usize) -> Result<()> {
        self.0.forecast_table(forecast, rows)?;
        self.1.forecast_table(forecast, rows)
    }

    fn forecast_chart(&mut self, history: &TrainingFrame, forecast: &ForecastFrame) -> Result<()> {
        self.0.forecast_chart(history, forecast)?;
        self.1.forecast_chart(history, forecast)
    }

    fn components_chart(&mut self, forecast: &ForecastFrame) -> Result<()> {
        self.0.components_chart(forecast)?;
        self.1.components_chart(forecast)
    }

    fn error(&mut self, err: &ForecastError) -> Result<()> {
        self.0.error(err)?;
        self.1.error(err)
    }
}
