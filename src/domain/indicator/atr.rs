//! Average True Range.
//!
//! True range per bar (first bar: high−low), smoothed with α = 1/w using the
//! same decaying convention as the EMA, so the ATR is defined from bar 0.

use crate::domain::indicator::{decaying_average, IndicatorSeries};
use crate::domain::ohlcv::Bar;

pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}

pub fn calculate_atr(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut series = IndicatorSeries::with_capacity(bars.len());
    if period == 0 {
        for bar in bars {
            series.push_invalid(bar.date);
        }
        return series;
    }

    let alpha = 1.0 / period as f64;
    let smoothed = decaying_average(&true_ranges(bars), alpha);

    for (bar, value) in bars.iter().zip(smoothed) {
        series.push(bar.date, true, value);
    }
    series
}
