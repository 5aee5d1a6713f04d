//! Rate of Change: fractional return over the last n bars.
//!
//! ROC(n)[i] = C[i]/C[i-n] − 1. Invalid for the first n bars and wherever
//! the reference close is 0.

use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::Bar;

pub fn calculate_roc(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut series = IndicatorSeries::with_capacity(bars.len());
    if period == 0 {
        for bar in bars {
            series.push_invalid(bar.date);
        }
        return series;
    }

    for (i, bar) in bars.iter().enumerate() {
        if i < period {
            series.push_invalid(bar.date);
            continue;
        }
        let reference = bars[i - period].close;
        if reference == 0.0 {
            series.push_invalid(bar.date);
            continue;
        }
        series.push(bar.date, true, bar.close / reference - 1.0);
    }
    series
}
