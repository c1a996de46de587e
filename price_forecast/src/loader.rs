//! Loading daily series with a process-local memo

use crate::data::{DailyBar, RawSeries};
use crate::error::{ForecastError, Result};
use crate::source::MarketDataSource;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::rc::Rc;

/// Cache key: `(ticker, start, end)`
pub type LoadKey = (String, NaiveDate, NaiveDate);

/// Memo of loaded series, keyed by request parameters.
///
/// Entries live until the cache is dropped; there is no expiry. Because the
/// end date is part of the key, a new day produces a new entry.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<LoadKey, Rc<RawSeries>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &LoadKey) -> Option<Rc<RawSeries>> {
        self.entries.get(key).cloned()
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    /// A failed computation leaves the cache untouched.
    pub fn get_or_try_insert_with<F>(&mut self, key: LoadKey, compute: F) -> Result<Rc<RawSeries>>
    where
        F: FnOnce() -> Result<RawSeries>,
    {
        if let Some(hit) = self.entries.get(&key) {
            return Ok(Rc::clone(hit));
        }
        let value = Rc::new(compute()?);
        self.entries.insert(key, Rc::clone(&value));
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Retrieves daily series from a [`MarketDataSource`], at most once per key
pub struct SeriesLoader {
    source: Box<dyn MarketDataSource>,
    cache: LoadCache,
}

impl SeriesLoader {
    pub fn new(source: Box<dyn MarketDataSource>) -> Self {
        Self {
            source,
            cache: LoadCache::new(),
        }
    }

    /// Load the bars of `ticker` over `[start, end]`.
    ///
    /// The first call for a key downloads; later calls with the same key return
    /// the same shared series without touching the source.
    pub fn load(&mut self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Rc<RawSeries>> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(ForecastError::unavailable(ticker, "empty ticker symbol"));
        }
        if start > end {
            return Err(ForecastError::EmptyRange {
                ticker: ticker.to_string(),
                start,
                end,
            });
        }

        let key = (ticker.to_string(), start, end);
        if self.cache.get(&key).is_some() {
            log::debug!("Cache hit for {} [{} .. {}]", ticker, start, end);
        }

        let source = self.source.as_ref();
        self.cache.get_or_try_insert_with(key, || {
            log::info!(
                "Fetching {} [{} .. {}] from {}",
                ticker,
                start,
                end,
                source.name()
            );
            let bars = source.daily_bars(ticker, start, end)?;
            let bars = normalize(bars, start, end);
            if bars.is_empty() {
                return Err(ForecastError::EmptyRange {
                    ticker: ticker.to_string(),
                    start,
                    end,
                });
            }
            log::info!("Loaded {} daily bars for {}", bars.len(), ticker);
            RawSeries::new(ticker, bars)
        })
    }

    /// Number of distinct keys loaded so far
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

/// Keep bars inside `[start, end]`, order them by session date and drop
/// repeated sessions (the later row wins).
fn normalize(mut bars: Vec<DailyBar>, start: NaiveDate, end: NaiveDate) -> Vec<DailyBar> {
    bars.retain(|b| {
        let day = b.calendar_date();
        day >= start && day <= end
    });
    bars.sort_by_key(DailyBar::calendar_date);

    let mut out: Vec<DailyBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.calendar_date() == bar.calendar_date() => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use std::cell::Cell;

    struct FixedSource {
        bars: Vec<DailyBar>,
        calls: Rc<Cell<usize>>,
    }

    impl MarketDataSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        fn daily_bars(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<Vec<DailyBar>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.bars.clone())
        }
    }

    fn bar(d: u32, close: f64) -> DailyBar {
        DailyBar {
            date: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2023, 3, d, 0, 0, 0)
                .unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 10,
        }
    }

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, d).unwrap()
    }

    #[test]
    fn test_normalize_sorts_trims_and_dedups() {
        let bars = vec![bar(3, 3.0), bar(1, 1.0), bar(2, 2.0), bar(3, 3.5), bar(9, 9.0)];
        let out = normalize(bars, ymd(2), ymd(5));

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].close, 2.0);
        assert_eq!(out[1].close, 3.5);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let calls = Rc::new(Cell::new(0));
        let mut loader = SeriesLoader::new(Box::new(FixedSource {
            bars: vec![bar(1, 1.0)],
            calls: Rc::clone(&calls),
        }));

        assert!(loader.load("AXISBANK.NS", ymd(10), ymd(12)).is_err());
        assert!(loader.load("AXISBANK.NS", ymd(10), ymd(12)).is_err());
        assert_eq!(calls.get(), 2);
        assert_eq!(loader.cached_len(), 0);
    }

    #[test]
    fn test_inverted_range_never_fetches() {
        let calls = Rc::new(Cell::new(0));
        let mut loader = SeriesLoader::new(Box::new(FixedSource {
            bars: vec![bar(1, 1.0)],
            calls: Rc::clone(&calls),
        }));

        assert!(matches!(
            loader.load("AXISBANK.NS", ymd(5), ymd(4)),
            Err(ForecastError::EmptyRange { .. })
        ));
        assert!(matches!(
            loader.load("  ", ymd(1), ymd(4)),
            Err(ForecastError::DataUnavailable { .. })
        ));
        assert_eq!(calls.get(), 0);
    }
}
