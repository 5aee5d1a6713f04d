//! Average Directional Index, the DMI-derived trend strength.
//!
//! +DM/−DM from bar-over-bar high/low moves, each smoothed with α = 1/w;
//! ±DI = 100·DM̄/ATR; DX = 100·|+DI − −DI| / (+DI + −DI); ADX is the same
//! decaying smoothing applied to the defined DX values.
//!
//! DI is undefined while ATR is 0, DX while the DI sum is 0, ADX until the
//! first defined DX. A flat series therefore never reports trend strength.

use crate::domain::indicator::atr::true_ranges;
use crate::domain::indicator::{decaying_average, IndicatorSeries};
use crate::domain::ohlcv::Bar;

pub fn calculate_adx(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut series = IndicatorSeries::with_capacity(bars.len());
    if period == 0 || bars.is_empty() {
        for bar in bars {
            series.push_invalid(bar.date);
        }
        return series;
    }

    let alpha = 1.0 / period as f64;

    let mut plus_dm = vec![0.0; bars.len()];
    let mut minus_dm = vec![0.0; bars.len()];
    for i in 1..bars.len() {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
    }

    let atr = decaying_average(&true_ranges(bars), alpha);
    let plus_sm = decaying_average(&plus_dm, alpha);
    let minus_sm = decaying_average(&minus_dm, alpha);

    // ADX smoothing runs over defined DX values only; undefined bars do not
    // advance the decay.
    let mut num = 0.0;
    let mut den = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if atr[i] <= 0.0 {
            series.push_invalid(bar.date);
            continue;
        }
        let plus_di = 100.0 * plus_sm[i] / atr[i];
        let minus_di = 100.0 * minus_sm[i] / atr[i];
        let di_sum = plus_di + minus_di;
        if di_sum <= 0.0 {
            series.push_invalid(bar.date);
            continue;
        }

        let dx = 100.0 * (plus_di - minus_di).abs() / di_sum;
        num = dx + (1.0 - alpha) * num;
        den = 1.0 + (1.0 - alpha) * den;
        series.push(bar.date, true, num / den);
    }

    series
}
