//! Line-oriented interactive session
//!
//! Each selection change reruns the whole pipeline, so repeated choices are
//! served from the loader's memo instead of the network.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use price_forecast::{ForecastRequest, StockApp};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ticker(String),
    Years(u32),
    Run,
    Tickers,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();

        let command = match (head, arg) {
            ("ticker", Some(t)) => Command::Ticker(t.to_string()),
            ("years", Some(n)) => Command::Years(n.parse()?),
            ("run", None) => Command::Run,
            ("tickers", None) => Command::Tickers,
            ("help", None) => Command::Help,
            ("quit" | "exit", None) => Command::Quit,
            _ => bail!("Unrecognised command '{}', try 'help'", line.trim()),
        };
        Ok(Some(command))
    }
}

const HELP: &str = "\
commands:
  ticker <SYMBOL>  select a dataset and rerun
  years <1-5>      select the forecast length and rerun
  run              rerun with the current selection
  tickers          list selectable symbols
  quit             leave the session";

/// Current selection plus the app that serves it
pub struct Session {
    app: StockApp,
    ticker: String,
    years: u32,
    end: NaiveDate,
}

impl Session {
    /// Start with the first configured ticker and the default years
    pub fn new(app: StockApp, end: NaiveDate) -> Self {
        let ticker = app.config().tickers.first().cloned().unwrap_or_default();
        let years = app.config().default_years;
        Self {
            app,
            ticker,
            years,
            end,
        }
    }

    pub fn app(&self) -> &StockApp {
        &self.app
    }

    /// Read commands until `quit` or end of input
    pub fn run_loop<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> Result<()> {
        writeln!(out, "{}", HELP)?;
        self.rerun(&mut out)?;

        for line in input.lines() {
            let line = line?;
            match Command::parse(&line) {
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => self.apply(command, &mut out)?,
                Ok(None) => {}
                Err(err) => writeln!(out, "{}", err)?,
            }
        }
        Ok(())
    }

    fn apply<W: Write>(&mut self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::Ticker(ticker) => {
                self.ticker = ticker;
                self.rerun(out)
            }
            Command::Years(years) => {
                self.years = years;
                self.rerun(out)
            }
            Command::Run => self.rerun(out),
            Command::Tickers => {
                for ticker in &self.app.config().tickers {
                    writeln!(out, "{}", ticker)?;
                }
                Ok(())
            }
            Command::Help => {
                writeln!(out, "{}", HELP)?;
                Ok(())
            }
            Command::Quit => Ok(()),
        }
    }

    /// Failed runs are already rendered by the app; the session keeps going
    fn rerun<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let request = ForecastRequest::new(&self.ticker, self.years, self.end);
        match self.app.run(&request) {
            Ok(summary) => writeln!(
                out,
                "{}: {} observations, forecast through {}",
                summary.ticker,
                summary.observations,
                summary.last_date.date()
            )?,
            Err(err) => log::debug!("Session run failed: {}", err),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use price_forecast::render::ConsoleRenderer;
    use price_forecast::source::CsvSource;
    use price_forecast::{AppConfig, SeriesLoader};
    use std::fmt::Write as _;
    use std::fs;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("ticker AXISBANK.NS").unwrap(),
            Some(Command::Ticker("AXISBANK.NS".to_string()))
        );
        assert_eq!(Command::parse("  years 3 ").unwrap(), Some(Command::Years(3)));
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(Command::parse("exit").unwrap(), Some(Command::Quit));
        assert!(Command::parse("years three").is_err());
        assert!(Command::parse("plot").is_err());
    }

    #[test]
    fn test_session_reuses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut csv = String::from("Date,Open,High,Low,Close,Volume\n");
        for day in 1..=20 {
            writeln!(csv, "2002-01-{:02},10,11,9,{}.5,100", day, 10 + day).unwrap();
        }
        fs::write(dir.path().join("ICICIBANK.NS.csv"), &csv).unwrap();

        let config = AppConfig::default();
        let app = StockApp::new(
            config,
            SeriesLoader::new(Box::new(CsvSource::new(dir.path()))),
            Box::new(price_forecast::models::AdditiveModel::default()),
            Box::new(ConsoleRenderer::new(Vec::new())),
        );
        let end = NaiveDate::from_ymd_opt(2002, 1, 31).unwrap();
        let mut session = Session::new(app, end);

        let input = "years 2\nticker MISSING\nticker ICICIBANK.NS\nquit\nyears 4\n";
        let mut out = Vec::new();
        session.run_loop(input.as_bytes(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("ICICIBANK.NS: 20 observations").count(), 3);
        assert!(text.contains("forecast through 2004-01-20"));
        assert_eq!(session.app().loader().cached_len(), 1);
    }
}
