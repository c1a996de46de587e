//! Yahoo Finance chart endpoint

use super::MarketDataSource;
use crate::config::SourceConfig;
use crate::data::DailyBar;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// Daily bars from `query1.finance.yahoo.com/v8/finance/chart`
#[derive(Debug)]
pub struct YahooSource {
    client: Client,
    base_url: String,
}

impl YahooSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ForecastError::ConfigError(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl MarketDataSource for YahooSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn daily_bars(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyBar>> {
        let (url, query) = chart_request(&self.base_url, ticker, start, end);
        log::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .map_err(|e| ForecastError::unavailable(ticker, format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ForecastError::unavailable(ticker, format!("unreadable response: {}", e)))?;

        read_response(ticker, status, &body)
    }
}

/// URL and query string for the daily bars of `ticker` over `[start, end]`
pub(crate) fn chart_request(
    base_url: &str,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> (String, Vec<(&'static str, String)>) {
    let period1 = midnight_utc_seconds(start);
    // period2 is exclusive on Yahoo's side
    let period2 = end
        .checked_add_days(Days::new(1))
        .map(midnight_utc_seconds)
        .unwrap_or(i64::MAX);

    (
        format!("{}/{}", base_url, ticker),
        vec![
            ("period1", period1.to_string()),
            ("period2", period2.to_string()),
            ("interval", "1d".to_string()),
            ("events", "history".to_string()),
        ],
    )
}

/// Turn an HTTP status and body into bars or a `DataUnavailable` error
pub(crate) fn read_response(ticker: &str, status: StatusCode, body: &str) -> Result<Vec<DailyBar>> {
    if status == StatusCode::NOT_FOUND {
        // Yahoo still sends a JSON error envelope with the reason
        return match parse_chart(ticker, body) {
            Err(err) => Err(err),
            Ok(_) => Err(ForecastError::unavailable(ticker, "symbol not found")),
        };
    }
    if !status.is_success() {
        return Err(ForecastError::unavailable(
            ticker,
            format!("HTTP status {}", status),
        ));
    }

    parse_chart(ticker, body)
}

fn midnight_utc_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::default()).and_utc().timestamp()
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i32,
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Decode a chart response body into daily bars.
///
/// Each timestamp is moved to the exchange offset and pinned to local
/// midnight, so a bar's date is its session date in the exchange's time zone.
/// Rows with a missing open/high/low/close are skipped.
pub(crate) fn parse_chart(ticker: &str, body: &str) -> Result<Vec<DailyBar>> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| ForecastError::unavailable(ticker, format!("malformed payload: {}", e)))?;

    if let Some(error) = envelope.chart.error {
        let reason = match error.description {
            Some(description) => format!("{}: {}", error.code, description),
            None => error.code,
        };
        return Err(ForecastError::unavailable(ticker, reason));
    }

    let result = envelope
        .chart
        .result
        .and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.swap_remove(0))
            }
        })
        .ok_or_else(|| ForecastError::unavailable(ticker, "empty chart result"))?;

    let offset = FixedOffset::east_opt(result.meta.gmtoffset).ok_or_else(|| {
        ForecastError::unavailable(
            ticker,
            format!("invalid gmtoffset {}", result.meta.gmtoffset),
        )
    })?;
    log::debug!(
        "{}: {} timestamps, exchange zone {:?} ({})",
        ticker,
        result.timestamp.len(),
        result.meta.exchange_timezone_name,
        offset
    );

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    let mut skipped = 0usize;
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let fields = (
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
        );
        let (open, high, low, close) = match fields {
            (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
            _ => {
                skipped += 1;
                continue;
            }
        };

        let instant = DateTime::from_timestamp(ts, 0).ok_or_else(|| {
            ForecastError::unavailable(ticker, format!("timestamp {} out of range", ts))
        })?;
        let session = instant.with_timezone(&offset).date_naive();
        let date = offset
            .from_local_datetime(&session.and_time(NaiveTime::default()))
            .single()
            .ok_or_else(|| {
                ForecastError::DataError(format!("Cannot place {} at offset {}", session, offset))
            })?;

        bars.push(DailyBar {
            date,
            open,
            high,
            low,
            close,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        });
    }

    if skipped > 0 {
        log::warn!("{}: skipped {} rows with missing prices", ticker, skipped);
    }

    Ok(bars)
}
