//! Plotly-compatible JSON figures written to a directory
//!
//! Each chart becomes one `{"data": [...], "layout": {...}}` document that any
//! Plotly front end can load as is. Tables and headings have no figure
//! counterpart and are ignored.

use super::Renderer;
use crate::data::{RawSeries, TrainingFrame};
use crate::error::{ForecastError, Result};
use crate::models::ForecastFrame;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: String,
    pub mode: &'static str,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
}

impl Trace {
    fn line(name: &str, x: Vec<String>, y: Vec<f64>) -> Self {
        Self {
            kind: "scatter",
            name: name.to_string(),
            mode: "lines",
            x,
            y,
            fill: None,
            xaxis: None,
            yaxis: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Layout {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<Grid>,
}

#[derive(Debug, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct Axis {
    pub rangeslider: RangeSlider,
}

#[derive(Debug, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}

#[derive(Debug, Serialize)]
pub struct Grid {
    pub rows: usize,
    pub columns: usize,
    pub pattern: &'static str,
}

/// Saves charts as `<ticker>_history.json`, `<ticker>_forecast.json` and
/// `<ticker>_components.json`
#[derive(Debug)]
pub struct FigureRenderer {
    dir: PathBuf,
    /// Ticker of the series being drawn, used in file names
    current: Option<String>,
    written: Vec<PathBuf>,
}

impl FigureRenderer {
    /// Create the output directory if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            current: None,
            written: Vec::new(),
        })
    }

    /// Files written so far, in order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn save(&mut self, suffix: &str, figure: &Figure) -> Result<()> {
        let stem = self
            .current
            .as_deref()
            .map(file_stem)
            .unwrap_or_else(|| "chart".to_string());
        let path = self.dir.join(format!("{}_{}.json", stem, suffix));
        fs::write(&path, serde_json::to_string_pretty(figure)?)?;
        log::info!("Wrote figure {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

/// Keep ticker symbols usable as file names (`^NSEI` -> `_NSEI`)
fn file_stem(ticker: &str) -> String {
    ticker
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}

fn layout(title: &str) -> Layout {
    Layout {
        title: Title {
            text: title.to_string(),
        },
        xaxis: None,
        grid: None,
    }
}

impl Renderer for FigureRenderer {
    fn title(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }

    fn section(&mut self, _level: usize, _text: &str) -> Result<()> {
        Ok(())
    }

    fn raw_table(&mut self, series: &RawSeries, _rows: usize) -> Result<()> {
        self.current = Some(series.ticker().to_string());
        Ok(())
    }

    fn raw_chart(&mut self, series: &RawSeries) -> Result<()> {
        self.current = Some(series.ticker().to_string());
        let x: Vec<String> = series.dates().iter().map(|d| d.to_string()).collect();

        let figure = Figure {
            data: vec![
                Trace::line("stock_open", x.clone(), series.opens()),
                Trace::line("stock_close", x, series.closes()),
            ],
            layout: Layout {
                xaxis: Some(Axis {
                    rangeslider: RangeSlider { visible: true },
                }),
                ..layout("Time Series Data")
            },
        };
        self.save("history", &figure)
    }

    fn forecast_table(&mut self, _forecast: &ForecastFrame, _rows: usize) -> Result<()> {
        Ok(())
    }

    fn forecast_chart(&mut self, history: &TrainingFrame, forecast: &ForecastFrame) -> Result<()> {
        let x: Vec<String> = forecast
            .timestamps()
            .iter()
            .map(|ds| ds.date().to_string())
            .collect();

        let mut actual = Trace::line(
            "actual",
            history
                .timestamps()
                .iter()
                .map(|ds| ds.date().to_string())
                .collect(),
            history.values(),
        );
        actual.mode = "markers";

        let lower = Trace::line(
            "yhat_lower",
            x.clone(),
            forecast.rows().iter().map(|r| r.yhat_lower).collect(),
        );
        let mut upper = Trace::line(
            "yhat_upper",
            x.clone(),
            forecast.rows().iter().map(|r| r.yhat_upper).collect(),
        );
        upper.fill = Some("tonexty");

        let figure = Figure {
            data: vec![actual, lower, upper, Trace::line("yhat", x, forecast.yhat())],
            layout: Layout {
                xaxis: Some(Axis {
                    rangeslider: RangeSlider { visible: true },
                }),
                ..layout("Forecast")
            },
        };
        self.save("forecast", &figure)
    }

    fn components_chart(&mut self, forecast: &ForecastFrame) -> Result<()> {
        let x: Vec<String> = forecast
            .timestamps()
            .iter()
            .map(|ds| ds.date().to_string())
            .collect();

        let mut panels = vec![("trend".to_string(), forecast.trend())];
        for name in forecast.component_names() {
            let values = forecast.component(name).ok_or_else(|| {
                ForecastError::RenderError(format!("Missing component '{}'", name))
            })?;
            panels.push((name.clone(), values));
        }

        let count = panels.len();
        let data = panels
            .into_iter()
            .enumerate()
            .map(|(i, (name, values))| {
                let mut trace = Trace::line(&name, x.clone(), values);
                if i > 0 {
                    trace.xaxis = Some(format!("x{}", i + 1));
                    trace.yaxis = Some(format!("y{}", i + 1));
                }
                trace
            })
            .collect();

        let figure = Figure {
            data,
            layout: Layout {
                grid: Some(Grid {
                    rows: count,
                    columns: 1,
                    pattern: "independent",
                }),
                ..layout("Forecast components")
            },
        };
        self.save("components", &figure)
    }

    fn error(&mut self, err: &ForecastError) -> Result<()> {
        log::warn!("No figure written: {}", err);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DailyBar;
    use chrono::{FixedOffset, TimeZone};
    use tempfile::tempdir;

    #[test]
    fn test_history_figure_layout() {
        let dir = tempdir().unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let bars = (1..=3)
            .map(|d| DailyBar {
                date: utc.with_ymd_and_hms(2024, 5, d, 0, 0, 0).unwrap(),
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                volume: 7,
            })
            .collect();
        let series = RawSeries::new("^NSEBANK", bars).unwrap();

        let mut renderer = FigureRenderer::new(dir.path()).unwrap();
        renderer.raw_chart(&series).unwrap();

        let path = dir.path().join("_NSEBANK_history.json");
        assert_eq!(renderer.written(), &[path.clone()]);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["layout"]["title"]["text"], "Time Series Data");
        assert_eq!(json["layout"]["xaxis"]["rangeslider"]["visible"], true);
        assert_eq!(json["data"][0]["name"], "stock_open");
        assert_eq!(json["data"][1]["x"][2], "2024-05-03");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("ICICIBANK.NS"), "ICICIBANK.NS");
        assert_eq!(file_stem("BRK/B"), "BRK_B");
    }
}
