//! Rolling N-bar high of close. Invalid for the first n−1 bars.

use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::Bar;

pub fn calculate_rolling_high(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut series = IndicatorSeries::with_capacity(bars.len());
    if period == 0 {
        for bar in bars {
            series.push_invalid(bar.date);
        }
        return series;
    }

    for (i, bar) in bars.iter().enumerate() {
        if i + 1 < period {
            series.push_invalid(bar.date);
            continue;
        }
        let window = &bars[i + 1 - period..=i];
        let high = window.iter().map(|b| b.close).fold(f64::MIN, f64::max);
        series.push(bar.date, true, high);
    }
    series
}
