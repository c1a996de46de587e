mod cli;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::Path;

use cli::{Cli, Commands, SourceArg};
use price_forecast::config::{AppConfig, SourceKind};
use price_forecast::models::AdditiveModel;
use price_forecast::render::{ConsoleRenderer, FigureRenderer, Renderer};
use price_forecast::{source, ForecastRequest, SeriesLoader, StockApp};

fn preprocess() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Defaults, then the optional TOML file, then command line overrides
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_toml_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => AppConfig::default(),
    };

    if let Some(kind) = cli.source {
        config.source.kind = match kind {
            SourceArg::Yahoo => SourceKind::Yahoo,
            SourceArg::Csv => SourceKind::Csv,
        };
    }
    if let Some(dir) = &cli.csv_dir {
        config.source.csv_dir = Some(dir.clone());
    }
    config.validate()?;
    Ok(config)
}

fn renderer(figures_dir: Option<&Path>) -> Result<Box<dyn Renderer>> {
    let console = ConsoleRenderer::new(io::stdout());
    let renderer: Box<dyn Renderer> = match figures_dir {
        Some(dir) => Box::new((console, FigureRenderer::new(dir)?)),
        None => Box::new(console),
    };
    Ok(renderer)
}

fn build_app(config: AppConfig, figures_dir: Option<&Path>) -> Result<StockApp> {
    let loader = SeriesLoader::new(source::from_config(&config.source)?);
    let model = AdditiveModel::new(config.model.clone())?;
    Ok(StockApp::new(
        config,
        loader,
        Box::new(model),
        renderer(figures_dir)?,
    ))
}

fn main() -> Result<()> {
    preprocess();

    let cli = Cli::parse();
    log::debug!("Command line input recorded: {cli:#?}");
    let config = load_config(&cli)?;
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Forecast(args) => {
            let years = args.years.unwrap_or(config.default_years);
            let request = ForecastRequest::new(&args.ticker, years, args.end.unwrap_or(today));
            let mut app = build_app(config, args.figures_dir.as_deref())?;
            let summary = app.run(&request)?;
            log::info!(
                "{}: {} observations, forecast through {}",
                summary.ticker,
                summary.observations,
                summary.last_date.date()
            );
        }

        Commands::Session(args) => {
            let app = build_app(config, args.figures_dir.as_deref())?;
            let mut session = session::Session::new(app, today);
            session.run_loop(io::stdin().lock(), io::stdout())?;
        }

        Commands::Tickers => {
            for ticker in &config.tickers {
                println!("{}", ticker);
            }
        }
    }

    Ok(())
}
