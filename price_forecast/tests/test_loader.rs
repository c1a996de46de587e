mod common;

use common::{trading_days, ymd, CountingSource};
use pretty_assertions::assert_eq;
use price_forecast::{ForecastError, SeriesLoader};
use std::rc::Rc;

fn loader(count: usize) -> (SeriesLoader, Rc<std::cell::Cell<usize>>) {
    let (source, calls) = CountingSource::new(trading_days(ymd(2002, 1, 1), count));
    (SeriesLoader::new(Box::new(source)), calls)
}

#[test]
fn test_load_is_ordered_and_within_range() {
    let (mut loader, _) = loader(300);
    let start = ymd(2002, 3, 1);
    let end = ymd(2002, 9, 30);

    let series = loader.load("AXISBANK.NS", start, end).unwrap();
    let dates = series.dates();

    assert!(!dates.is_empty());
    assert!(dates.windows(2).all(|w| w[0] < w[1]));
    assert!(dates.iter().all(|d| *d >= start && *d <= end));
    assert_eq!(series.ticker(), "AXISBANK.NS");
}

#[test]
fn test_repeated_load_is_served_from_cache() {
    let (mut loader, calls) = loader(50);
    let start = ymd(2002, 1, 1);
    let end = ymd(2002, 3, 31);

    let first = loader.load("ICICIBANK.NS", start, end).unwrap();
    let second = loader.load("ICICIBANK.NS", start, end).unwrap();

    assert_eq!(calls.get(), 1);
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(loader.cached_len(), 1);
}

#[test]
fn test_new_end_date_fetches_again() {
    let (mut loader, calls) = loader(50);
    let start = ymd(2002, 1, 1);

    let before = loader.load("ICICIBANK.NS", start, ymd(2002, 2, 28)).unwrap();
    let after = loader.load("ICICIBANK.NS", start, ymd(2002, 3, 1)).unwrap();

    assert_eq!(calls.get(), 2);
    assert!(!Rc::ptr_eq(&before, &after));
    assert_eq!(after.len(), before.len() + 1);
}

#[test]
fn test_each_ticker_has_its_own_entry() {
    let (mut loader, calls) = loader(20);
    let start = ymd(2002, 1, 1);
    let end = ymd(2002, 1, 31);

    loader.load("ICICIBANK.NS", start, end).unwrap();
    loader.load("HDFCBANK.NS", start, end).unwrap();
    loader.load("ICICIBANK.NS", start, end).unwrap();

    assert_eq!(calls.get(), 2);
    assert_eq!(loader.cached_len(), 2);
}

#[test]
fn test_single_day_range() {
    let (mut loader, _) = loader(5);
    let day = ymd(2002, 1, 1);

    let series = loader.load("ICICIBANK.NS", day, day).unwrap();

    assert_eq!(series.len(), 1);
    assert_eq!(series.first_date(), Some(day));
}

#[test]
fn test_range_without_sessions_is_empty() {
    let (mut loader, calls) = loader(5);
    // 2002-01-05 is a Saturday
    let saturday = ymd(2002, 1, 5);

    let err = loader.load("ICICIBANK.NS", saturday, saturday).unwrap_err();

    assert!(matches!(err, ForecastError::EmptyRange { .. }));
    assert_eq!(loader.cached_len(), 0);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_inverted_range_rejected_before_fetch() {
    let (mut loader, calls) = loader(5);

    let err = loader
        .load("ICICIBANK.NS", ymd(2002, 2, 1), ymd(2002, 1, 1))
        .unwrap_err();

    assert!(matches!(err, ForecastError::EmptyRange { .. }));
    assert_eq!(calls.get(), 0);
}
