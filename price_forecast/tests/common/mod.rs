//! Shared fixtures for integration tests

#![allow(dead_code)]

use chrono::{Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Weekday};
use price_forecast::source::MarketDataSource;
use price_forecast::{DailyBar, Result};
use std::cell::Cell;
use std::rc::Rc;

/// India Standard Time, the offset NSE sessions are reported in
pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 1800).unwrap()
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `count` weekday sessions starting at `first`, with a drifting wavy close
pub fn trading_days(first: NaiveDate, count: usize) -> Vec<DailyBar> {
    let mut bars = Vec::with_capacity(count);
    let mut day = first;
    while bars.len() < count {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            let k = bars.len() as f64;
            let close = 100.0 + 0.05 * k + 2.0 * (k / 10.0).sin();
            bars.push(DailyBar {
                date: ist()
                    .from_local_datetime(&day.and_hms_opt(0, 0, 0).unwrap())
                    .unwrap(),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000 + bars.len() as u64,
            });
        }
        day += Duration::days(1);
    }
    bars
}

/// In-memory source that counts how often it is asked for data
pub struct CountingSource {
    bars: Vec<DailyBar>,
    calls: Rc<Cell<usize>>,
}

impl CountingSource {
    pub fn new(bars: Vec<DailyBar>) -> (Self, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        (
            Self {
                bars,
                calls: Rc::clone(&calls),
            },
            calls,
        )
    }
}

impl MarketDataSource for CountingSource {
    fn name(&self) -> &str {
        "counting"
    }

    fn daily_bars(&self, _ticker: &str, _start: NaiveDate, _end: NaiveDate) -> Result<Vec<DailyBar>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.bars.clone())
    }
}
