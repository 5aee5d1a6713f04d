//! Event-driven backtest: entries decided on a coarse timeframe, exits on a
//! fine one (weekly/daily by default; equal intervals give a plain
//! single-timeframe backtest).
//!
//! The loop walks the coarse series applying the entry and take-profit
//! steps of the state machine; while a position is open it resolves each
//! coarse timestamp onto the fine series and evaluates the rotating stop
//! against the fine close. Alignment is the correctness-critical detail:
//! **backward-fill once at entry** (anchors the bars-held counter to the
//! first tradable fine bar at or after the entry) and **forward-fill for
//! every later lookup** (the latest completed fine bar at or before the
//! coarse timestamp).

use crate::domain::conditions::{
    dynamic_stop, entry_ready, exit_ready, tp_ready, ConditionFlags, IndicatorSet,
};
use crate::domain::error::TrendscanError;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::{validate_series, Bar};
use crate::domain::position::PositionState;
use crate::domain::report::RunReport;
use crate::domain::signal::{SignalEvent, SignalKind};
use crate::domain::strategy::StrategyParams;
use crate::ports::data_port::{DataPort, Interval};
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Timeframe driving entries and take-profits.
    pub entry_interval: Interval,
    /// Timeframe driving the stop checks.
    pub exit_interval: Interval,
}

impl BacktestConfig {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        BacktestConfig {
            start_date,
            end_date,
            entry_interval: Interval::Weekly,
            exit_interval: Interval::Daily,
        }
    }
}

/// Index alignment mode for mapping a coarse timestamp onto a fine series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// First bar at or after the date. Used once, at entry.
    BackwardFill,
    /// Last bar at or before the date. Used for every later lookup.
    ForwardFill,
}

/// Locate `date` in a date-sorted series under the given alignment mode.
/// Returns `None` when no bar satisfies the mode (date past the series end
/// for backward-fill, before its start for forward-fill).
pub fn align_index(bars: &[Bar], date: NaiveDate, mode: Alignment) -> Option<usize> {
    match mode {
        Alignment::BackwardFill => {
            let idx = bars.partition_point(|b| b.date < date);
            (idx < bars.len()).then_some(idx)
        }
        Alignment::ForwardFill => {
            let idx = bars.partition_point(|b| b.date <= date);
            idx.checked_sub(1)
        }
    }
}

/// Fine series materialized while a position is open; discarded on exit so
/// the next entry re-fetches from its own entry date.
struct ExitCache {
    bars: Vec<Bar>,
    ema_short: IndicatorSeries,
    ema_medium: IndicatorSeries,
    ema_long: IndicatorSeries,
    entry_index: usize,
}

impl ExitCache {
    fn fetch(
        data: &dyn DataPort,
        ticker: &str,
        entry_date: NaiveDate,
        config: &BacktestConfig,
        params: &StrategyParams,
    ) -> Result<ExitCache, TrendscanError> {
        let bars = data.fetch_ohlcv(ticker, config.exit_interval, entry_date, config.end_date)?;
        validate_series(&bars)?;

        let entry_index = align_index(&bars, entry_date, Alignment::BackwardFill).ok_or_else(
            || TrendscanError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: format!(
                    "no {} bars at or after entry date {}",
                    config.exit_interval, entry_date
                ),
            },
        )?;

        Ok(ExitCache {
            ema_short: calculate_ema(&bars, params.ema_short),
            ema_medium: calculate_ema(&bars, params.ema_medium),
            ema_long: calculate_ema(&bars, params.ema_long),
            bars,
            entry_index,
        })
    }
}

/// Backtest one ticker over its full history.
pub fn run_ticker_backtest(
    data: &dyn DataPort,
    ticker: &str,
    params: &StrategyParams,
    config: &BacktestConfig,
) -> Result<Vec<SignalEvent>, TrendscanError> {
    let coarse =
        data.fetch_ohlcv(ticker, config.entry_interval, config.start_date, config.end_date)?;
    validate_series(&coarse)?;

    if coarse.len() < params.required_history() {
        return Err(TrendscanError::InsufficientHistory {
            ticker: ticker.to_string(),
            bars: coarse.len(),
            required: params.required_history(),
        });
    }

    let indicators = IndicatorSet::compute(&coarse, params);
    let mut state = PositionState::Flat;
    let mut events = Vec::new();
    let mut exit_cache: Option<ExitCache> = None;
    let mut cooldown_until: Option<usize> = None;

    for (i, bar) in coarse.iter().enumerate() {
        let mut flags = ConditionFlags::default();

        match &state {
            PositionState::Open(pos) => {
                if exit_cache.is_none() {
                    exit_cache = Some(ExitCache::fetch(
                        data,
                        ticker,
                        pos.entry_date,
                        config,
                        params,
                    )?);
                }
                let cache = exit_cache.as_ref().expect("cache set while open");

                if let Some(j) = align_index(&cache.bars, bar.date, Alignment::ForwardFill) {
                    let bars_held = j.saturating_sub(cache.entry_index);
                    let stop = dynamic_stop(
                        &cache.ema_short,
                        &cache.ema_medium,
                        &cache.ema_long,
                        params,
                        bars_held,
                        j,
                    );
                    flags.exit = exit_ready(cache.bars[j].close, stop);
                }

                flags.tp1 = tp_ready(&coarse, params, pos.entry_price, params.tp1_pct, i);
                flags.tp2 = tp_ready(&coarse, params, pos.entry_price, params.tp2_pct, i);
            }
            PositionState::Flat => {
                let past_cooldown = cooldown_until.is_none_or(|until| i > until);
                flags.entry = past_cooldown && entry_ready(&coarse, &indicators, params, i);
            }
        }

        if let Some(event) = state.apply(flags, ticker, bar.date, bar.close) {
            match event.kind {
                SignalKind::Exit => {
                    if params.cooldown_bars > 0 {
                        cooldown_until = Some(i + params.cooldown_bars);
                    }
                    exit_cache = None;
                }
                SignalKind::Entry => {
                    // stale cache from a previous cycle must not leak in
                    exit_cache = None;
                }
                SignalKind::Tp1 | SignalKind::Tp2 => {}
            }
            events.push(event);
        }
    }

    if state.is_open() {
        let last = coarse.last().expect("non-empty series");
        if let Some(event) = state.force_close(ticker, last.date, last.close) {
            events.push(event);
        }
    }

    Ok(events)
}

/// Backtest the whole universe. Per-ticker failures are recorded and the
/// loop continues; this is the error propagation boundary.
pub fn run_universe_backtest(
    data: &dyn DataPort,
    tickers: &[String],
    params: &StrategyParams,
    config: &BacktestConfig,
) -> RunReport {
    let mut report = RunReport::default();
    for ticker in tickers {
        match run_ticker_backtest(data, ticker, params, config) {
            Ok(events) => report.events.extend(events),
            Err(err) => report.record_failure(ticker, &err),
        }
    }
    report
}
