//! Condition evaluation: pure functions from indicators to per-bar flags.
//!
//! Every check reads indicator values through [`IndicatorSeries::value_at`],
//! so an undefined indicator makes the flag false, never an error.

use crate::domain::indicator::adx::calculate_adx;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::roc::calculate_roc;
use crate::domain::indicator::rolling_high::calculate_rolling_high;
use crate::domain::indicator::sma::{calculate_sma, calculate_volume_sma};
use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::Bar;
use crate::domain::strategy::{StrategyParams, TpReference};

/// The four per-bar flags consumed by the position state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConditionFlags {
    pub entry: bool,
    pub exit: bool,
    pub tp1: bool,
    pub tp2: bool,
}

/// All indicator series for one ticker, aligned to its bar series.
///
/// Series for disabled screens are left empty; an empty series reads as
/// undefined everywhere.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    pub ema_short: IndicatorSeries,
    pub ema_medium: IndicatorSeries,
    pub ema_long: IndicatorSeries,
    pub sma_fast: IndicatorSeries,
    pub sma_slow: IndicatorSeries,
    pub sma_trend: IndicatorSeries,
    pub atr: IndicatorSeries,
    pub adx: IndicatorSeries,
    pub roc_short: IndicatorSeries,
    pub roc_medium: IndicatorSeries,
    pub roc_long: IndicatorSeries,
    pub rolling_high: IndicatorSeries,
    pub volume_sma: IndicatorSeries,
}

impl IndicatorSet {
    pub fn compute(bars: &[Bar], params: &StrategyParams) -> IndicatorSet {
        let empty = || IndicatorSeries::with_capacity(0);

        let (roc_short, roc_medium, roc_long) = if params.momentum_filter {
            (
                calculate_roc(bars, params.roc_short),
                calculate_roc(bars, params.roc_medium),
                calculate_roc(bars, params.roc_long),
            )
        } else {
            (empty(), empty(), empty())
        };

        let rolling_high = if params.breakout_filter {
            calculate_rolling_high(bars, params.high_window)
        } else {
            empty()
        };

        let volume_sma = if params.breakout_filter || params.quality_filter {
            calculate_volume_sma(bars, params.volume_window)
        } else {
            empty()
        };

        IndicatorSet {
            ema_short: calculate_ema(bars, params.ema_short),
            ema_medium: calculate_ema(bars, params.ema_medium),
            ema_long: calculate_ema(bars, params.ema_long),
            sma_fast: calculate_sma(bars, params.sma_fast),
            sma_slow: calculate_sma(bars, params.sma_slow),
            sma_trend: calculate_sma(bars, params.sma_trend),
            atr: calculate_atr(bars, params.atr_period),
            adx: calculate_adx(bars, params.adx_period),
            roc_short,
            roc_medium,
            roc_long,
            rolling_high,
            volume_sma,
        }
    }
}

/// Entry condition at bar `i`: trend alignment, trend strength, rising
/// long-horizon average, minimum MA spread and minimum volatility, plus any
/// enabled screens.
pub fn entry_ready(bars: &[Bar], ind: &IndicatorSet, params: &StrategyParams, i: usize) -> bool {
    let close = bars[i].close;
    if close <= 0.0 {
        return false;
    }

    let (Some(sma_trend), Some(sma_fast), Some(sma_slow), Some(adx), Some(atr)) = (
        ind.sma_trend.value_at(i),
        ind.sma_fast.value_at(i),
        ind.sma_slow.value_at(i),
        ind.adx.value_at(i),
        ind.atr.value_at(i),
    ) else {
        return false;
    };
    let (Some(ema_short), Some(ema_long)) =
        (ind.ema_short.value_at(i), ind.ema_long.value_at(i))
    else {
        return false;
    };
    let Some(trend_slope) = trend_slope(ind, params, i) else {
        return false;
    };

    close > sma_trend
        && sma_fast > sma_slow
        && adx > params.adx_min
        && trend_slope > 0.0
        && (ema_short - ema_long).abs() / close > params.spread_min
        && atr / close > params.atr_ratio_min
        && momentum_ok(ind, params, i)
        && breakout_ok(bars, ind, params, i)
        && quality_ok(bars, ind, params, i)
}

/// Change of the long-horizon SMA over the slope lookback window.
fn trend_slope(ind: &IndicatorSet, params: &StrategyParams, i: usize) -> Option<f64> {
    if i < params.slope_lookback {
        return None;
    }
    let now = ind.sma_trend.value_at(i)?;
    let then = ind.sma_trend.value_at(i - params.slope_lookback)?;
    Some(now - then)
}

fn momentum_ok(ind: &IndicatorSet, params: &StrategyParams, i: usize) -> bool {
    if !params.momentum_filter {
        return true;
    }
    let (Some(short), Some(medium), Some(long)) = (
        ind.roc_short.value_at(i),
        ind.roc_medium.value_at(i),
        ind.roc_long.value_at(i),
    ) else {
        return false;
    };
    short > params.roc_short_min && medium > params.roc_medium_min && long > params.roc_long_min
}

fn breakout_ok(bars: &[Bar], ind: &IndicatorSet, params: &StrategyParams, i: usize) -> bool {
    if !params.breakout_filter {
        return true;
    }
    let (Some(high), Some(avg_volume)) =
        (ind.rolling_high.value_at(i), ind.volume_sma.value_at(i))
    else {
        return false;
    };
    bars[i].close >= params.high_proximity * high
        && bars[i].volume as f64 >= params.volume_surge * avg_volume
}

fn quality_ok(bars: &[Bar], ind: &IndicatorSet, params: &StrategyParams, i: usize) -> bool {
    if !params.quality_filter {
        return true;
    }
    let Some(avg_volume) = ind.volume_sma.value_at(i) else {
        return false;
    };
    bars[i].close >= params.min_price && avg_volume >= params.min_avg_volume
}

/// The dynamic stop level: the EMA tier loosens as the position matures.
/// Short holding periods compare against the longest-horizon EMA, long
/// holding periods against the shortest.
pub fn dynamic_stop(
    ema_short: &IndicatorSeries,
    ema_medium: &IndicatorSeries,
    ema_long: &IndicatorSeries,
    params: &StrategyParams,
    bars_held: usize,
    i: usize,
) -> Option<f64> {
    if bars_held <= params.hold_short_max {
        ema_long.value_at(i)
    } else if bars_held <= params.hold_medium_max {
        ema_medium.value_at(i)
    } else {
        ema_short.value_at(i)
    }
}

/// Exit condition: close below the prevailing dynamic stop. An undefined
/// stop never triggers.
pub fn exit_ready(close: f64, stop: Option<f64>) -> bool {
    stop.is_some_and(|level| close < level)
}

/// Take-profit condition: close at least `pct` above the reference price.
/// The reference is the entry price or the previous bar's close, per
/// configuration. Only meaningful while a position is open.
pub fn tp_ready(
    bars: &[Bar],
    params: &StrategyParams,
    entry_price: f64,
    pct: f64,
    i: usize,
) -> bool {
    let reference = match params.tp_reference {
        TpReference::Entry => entry_price,
        TpReference::PrevClose => {
            if i == 0 {
                return false;
            }
            bars[i - 1].close
        }
    };
    reference > 0.0 && bars[i].close >= reference * (1.0 + pct)
}
