//! Plain-text rendering for terminals

use super::Renderer;
use crate::data::{RawSeries, TrainingFrame};
use crate::error::{ForecastError, Result};
use crate::models::ForecastFrame;
use std::io::Write;
use trade_math::stats;

const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Writes headings, polars tables and sparkline charts to any writer
pub struct ConsoleRenderer<W: Write> {
    out: W,
    /// Characters per sparkline
    width: usize,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, width: 60 }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(1);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, label: &str, spark: &str, lo: f64, hi: f64) -> Result<()> {
        writeln!(self.out, "{:<12} {} [{:.2} .. {:.2}]", label, spark, lo, hi)?;
        Ok(())
    }

    /// One sparkline scaled to the series' own range
    fn chart_line(&mut self, label: &str, values: &[f64]) -> Result<()> {
        let (lo, hi) = stats::min_max(values).unwrap_or((0.0, 0.0));
        let spark = sparkline(values, self.width, lo, hi);
        self.line(label, &spark, lo, hi)
    }
}

/// Average `values` into at most `width` buckets and map each onto a bar glyph
/// between `lo` and `hi`.
pub fn sparkline(values: &[f64], width: usize, lo: f64, hi: f64) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }

    let buckets = width.min(values.len());
    let span = hi - lo;
    (0..buckets)
        .map(|b| {
            let from = b * values.len() / buckets;
            let to = ((b + 1) * values.len() / buckets).max(from + 1);
            let avg = values[from..to].iter().sum::<f64>() / (to - from) as f64;
            let level = if span > 0.0 {
                (((avg - lo) / span) * (LEVELS.len() - 1) as f64).round() as usize
            } else {
                0
            };
            LEVELS[level.min(LEVELS.len() - 1)]
        })
        .collect()
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn title(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "# {}\n", text)?;
        Ok(())
    }

    fn section(&mut self, level: usize, text: &str) -> Result<()> {
        writeln!(self.out, "{} {}\n", "#".repeat(level.max(1)), text)?;
        Ok(())
    }

    fn raw_table(&mut self, series: &RawSeries, rows: usize) -> Result<()> {
        let df = series.to_dataframe()?.tail(Some(rows));
        writeln!(self.out, "{}\n", df)?;
        Ok(())
    }

    fn raw_chart(&mut self, series: &RawSeries) -> Result<()> {
        if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
            writeln!(self.out, "Time Series Data ({} .. {})", first, last)?;
        }
        self.chart_line("stock_open", &series.opens())?;
        self.chart_line("stock_close", &series.closes())?;
        writeln!(self.out)?;
        Ok(())
    }

    fn forecast_table(&mut self, forecast: &ForecastFrame, rows: usize) -> Result<()> {
        let df = forecast.to_dataframe()?.tail(Some(rows));
        writeln!(self.out, "{}\n", df)?;
        Ok(())
    }

    fn forecast_chart(&mut self, history: &TrainingFrame, forecast: &ForecastFrame) -> Result<()> {
        if forecast.is_empty() {
            return Err(ForecastError::RenderError(
                "Nothing to plot: empty forecast".to_string(),
            ));
        }
        if let (Some(first), Some(last)) = (forecast.first_date(), forecast.last_date()) {
            writeln!(self.out, "Forecast ({} .. {})", first.date(), last.date())?;
        }

        let lower: Vec<f64> = forecast.rows().iter().map(|r| r.yhat_lower).collect();
        let upper: Vec<f64> = forecast.rows().iter().map(|r| r.yhat_upper).collect();
        let actual = history.values();

        // one scale for every line so the band reads correctly
        let mut all = lower.clone();
        all.extend_from_slice(&upper);
        all.extend_from_slice(&actual);
        let (lo, hi) = stats::min_max(&all).unwrap_or((0.0, 0.0));

        let actual_width =
            ((self.width * history.len()) as f64 / forecast.len() as f64).round() as usize;
        let spark = sparkline(&actual, actual_width.clamp(1, self.width), lo, hi);
        self.line("actual", &spark, lo, hi)?;
        for (label, values) in [
            ("yhat_upper", upper),
            ("yhat", forecast.yhat()),
            ("yhat_lower", lower),
        ] {
            let spark = sparkline(&values, self.width, lo, hi);
            self.line(label, &spark, lo, hi)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn components_chart(&mut self, forecast: &ForecastFrame) -> Result<()> {
        self.chart_line("trend", &forecast.trend())?;
        for name in forecast.component_names() {
            if let Some(values) = forecast.component(name) {
                self.chart_line(name, &values)?;
            }
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn error(&mut self, err: &ForecastError) -> Result<()> {
        writeln!(self.out, "Error: {}\n", err)?;
        Ok(())
    }
}
