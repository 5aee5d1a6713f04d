#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use trendscan::domain::error::TrendscanError;
pub use trendscan::domain::ohlcv::Bar;
use trendscan::ports::data_port::{DataPort, Interval};

pub struct MockDataPort {
    pub series: HashMap<(String, Interval), Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, ticker: &str, interval: Interval, bars: Vec<Bar>) -> Self {
        self.series.insert((ticker.to_string(), interval), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        interval: Interval,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, TrendscanError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(TrendscanError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        let bars = self
            .series
            .get(&(ticker.to_string(), interval))
            .ok_or_else(|| TrendscanError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: "unknown ticker".into(),
            })?;
        Ok(bars
            .iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .cloned()
            .collect())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn epoch() -> NaiveDate {
    date(2018, 1, 1)
}

/// One bar with a small high/low band around the close.
pub fn make_bar(ticker: &str, day_offset: i64, close: f64, step_days: i64) -> Bar {
    Bar {
        ticker: ticker.to_string(),
        date: epoch() + chrono::Duration::days(day_offset * step_days),
        open: close,
        high: close * 1.02,
        low: close * 0.97,
        close,
        volume: 500_000,
    }
}

pub fn daily_bars(ticker: &str, closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(ticker, i as i64, c, 1))
        .collect()
}

pub fn weekly_bars(ticker: &str, closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(ticker, i as i64, c, 7))
        .collect()
}

/// Weekly closes plus the matching daily step-function series.
pub fn weekly_and_daily(ticker: &str, closes: &[f64]) -> (Vec<Bar>, Vec<Bar>) {
    let weekly = weekly_bars(ticker, closes);
    let daily_closes: Vec<f64> = (0..closes.len() * 7).map(|i| closes[i / 7]).collect();
    (weekly, daily_bars(ticker, &daily_closes))
}

/// n closes rising linearly from `from` to `to`.
pub fn linear_closes(n: usize, from: f64, to: f64) -> Vec<f64> {
    (0..n)
        .map(|i| from + (to - from) * i as f64 / (n - 1) as f64)
        .collect()
}
