//! Simple Moving Average of close (and of volume, for the liquidity screens).
//!
//! Warmup: first (w-1) bars are invalid.

use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::Bar;

pub fn calculate_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    rolling_mean(bars, period, |b| b.close)
}

pub fn calculate_volume_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    rolling_mean(bars, period, |b| b.volume as f64)
}

fn rolling_mean(bars: &[Bar], period: usize, field: impl Fn(&Bar) -> f64) -> IndicatorSeries {
    let mut series = IndicatorSeries::with_capacity(bars.len());
    if period == 0 {
        for bar in bars {
            series.push_invalid(bar.date);
        }
        return series;
    }

    let mut window_sum = 0.0;
    for (i, bar) in bars.iter().enumerate() {
        window_sum += field(bar);
        if i >= period {
            window_sum -= field(&bars[i - period]);
        }
        if i + 1 >= period {
            series.push(bar.date, true, window_sum / period as f64);
        } else {
            series.push_invalid(bar.date);
        }
    }
    series
}
