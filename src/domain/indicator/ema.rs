//! Exponential Moving Average of close.
//!
//! α = 2/(span+1), exponential-window form: each value is the decaying
//! weighted average of all closes so far, so the series is defined from
//! bar 0. The dual-timeframe exit rule depends on this: a daily series
//! fetched at entry must produce a usable long-horizon EMA immediately.

use crate::domain::indicator::{decaying_average, IndicatorSeries};
use crate::domain::ohlcv::Bar;

pub fn calculate_ema(bars: &[Bar], span: usize) -> IndicatorSeries {
    let mut series = IndicatorSeries::with_capacity(bars.len());
    if span == 0 {
        for bar in bars {
            series.push_invalid(bar.date);
        }
        return series;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let averaged = decaying_average(&closes, alpha);

    for (bar, value) in bars.iter().zip(averaged) {
        series.push(bar.date, true, value);
    }
    series
}
