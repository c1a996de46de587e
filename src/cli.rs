use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML configuration file; built-in defaults are used without one.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Market data source, overriding the configuration.
    #[arg(long, value_enum, global = true)]
    pub source: Option<SourceArg>,

    /// Directory of `<TICKER>.csv` files for the csv source.
    #[arg(long, global = true)]
    pub csv_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load one ticker, forecast it and print the results.
    Forecast(ForecastArgs),

    /// Interactive loop: change ticker or years and see the forecast rerun.
    Session(SessionArgs),

    /// List the selectable tickers.
    Tickers,
}

#[derive(Args, Debug)]
pub struct ForecastArgs {
    /// Symbol from the configured ticker set.
    #[arg(long)]
    pub ticker: String,

    /// Years of prediction, 1 to 5.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=5))]
    pub years: Option<u32>,

    /// Last day of history, YYYY-MM-DD (default: today).
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Also write Plotly JSON figures into this directory.
    #[arg(long)]
    pub figures_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Also write Plotly JSON figures into this directory.
    #[arg(long)]
    pub figures_dir: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceArg {
    Yahoo,
    Csv,
}
