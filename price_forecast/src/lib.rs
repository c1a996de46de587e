//! # Price Forecast
//!
//! A Rust library for loading daily stock prices and forecasting them a few
//! years ahead.
//!
//! ## Features
//!
//! - Daily OHLCV retrieval from Yahoo Finance or local CSV files
//! - A per-process memo so each `(ticker, start, end)` is downloaded once
//! - Preparation of `(ds, y)` training frames and year-based horizons
//! - An additive trend plus seasonality forecaster with uncertainty bands
//! - Console and Plotly JSON renderers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use price_forecast::config::AppConfig;
//! use price_forecast::loader::SeriesLoader;
//! use price_forecast::models::AdditiveModel;
//! use price_forecast::pipeline::{ForecastRequest, StockApp};
//! use price_forecast::render::ConsoleRenderer;
//! use price_forecast::source;
//!
//! let config = AppConfig::default();
//! let loader = SeriesLoader::new(source::from_config(&config.source)?);
//! let model = AdditiveModel::new(config.model.clone())?;
//! let mut app = StockApp::new(
//!     config,
//!     loader,
//!     Box::new(model),
//!     Box::new(ConsoleRenderer::new(std::io::stdout())),
//! );
//!
//! let end = chrono::Local::now().date_naive();
//! let summary = app.run(&ForecastRequest::new("ICICIBANK.NS", 1, end))?;
//! println!("{} rows forecast up to {}", summary.observations, summary.last_date);
//! # Ok::<(), price_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod prepare;
pub mod render;
pub mod source;

// Re-export commonly used types
pub use crate::config::AppConfig;
pub use crate::data::{DailyBar, Horizon, RawSeries, TrainingFrame};
pub use crate::error::{ForecastError, Result};
pub use crate::loader::SeriesLoader;
pub use crate::models::{ForecastFrame, ForecastModel, Forecaster};
pub use crate::pipeline::{ForecastRequest, ForecastSummary, StockApp};
pub use crate::prepare::ForecastPreparer;
pub use crate::render::Renderer;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
