//! Daily universe scan: evaluate only the latest bar of every ticker
//! against the persisted position state and collect the emitted signals.

use crate::domain::backtest::{align_index, Alignment};
use crate::domain::conditions::{
    dynamic_stop, entry_ready, exit_ready, tp_ready, ConditionFlags, IndicatorSet,
};
use crate::domain::error::TrendscanError;
use crate::domain::ohlcv::validate_series;
use crate::domain::position::PositionState;
use crate::domain::report::RunReport;
use crate::domain::signal::SignalEvent;
use crate::domain::strategy::StrategyParams;
use crate::ports::data_port::{DataPort, Interval};
use crate::ports::store_port::StorePort;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Start of the fetched history window; must cover the longest lookback.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Everything a scan produces: the events plus the updated position map the
/// caller hands back to the store.
#[derive(Debug)]
pub struct ScanOutcome {
    pub report: RunReport,
    pub positions: HashMap<String, PositionState>,
}

/// Scan the whole universe. Per-ticker failures are recorded and the loop
/// continues. A ticker's state is only updated in the returned map after
/// its evaluation completed; a failed ticker keeps its stored state.
pub fn run_scan(
    data: &dyn DataPort,
    store: &dyn StorePort,
    tickers: &[String],
    params: &StrategyParams,
    config: &ScanConfig,
) -> Result<ScanOutcome, TrendscanError> {
    let mut positions = store.load(tickers)?;
    let mut report = RunReport::default();

    for ticker in tickers {
        let state = positions.get(ticker).cloned().unwrap_or_default();
        match scan_ticker(data, ticker, state, params, config) {
            Ok((new_state, event)) => {
                positions.insert(ticker.clone(), new_state);
                report.events.extend(event);
            }
            Err(err) => report.record_failure(ticker, &err),
        }
    }

    Ok(ScanOutcome { report, positions })
}

/// Evaluate one ticker's latest bar. Returns the advanced state and the
/// event emitted on that bar, if any.
fn scan_ticker(
    data: &dyn DataPort,
    ticker: &str,
    mut state: PositionState,
    params: &StrategyParams,
    config: &ScanConfig,
) -> Result<(PositionState, Option<SignalEvent>), TrendscanError> {
    let bars = data.fetch_ohlcv(ticker, Interval::Daily, config.start_date, config.end_date)?;
    validate_series(&bars)?;

    if bars.len() < params.required_history() {
        return Err(TrendscanError::InsufficientHistory {
            ticker: ticker.to_string(),
            bars: bars.len(),
            required: params.required_history(),
        });
    }

    let indicators = IndicatorSet::compute(&bars, params);
    let i = bars.len() - 1;
    let bar = &bars[i];

    let mut flags = ConditionFlags::default();
    match &state {
        PositionState::Open(pos) => {
            // entries older than the window anchor at the first fetched bar,
            // which lands them in the loosest stop tier anyway
            let entry_index =
                align_index(&bars, pos.entry_date, Alignment::BackwardFill).unwrap_or(0);
            let days_held = i.saturating_sub(entry_index);
            let stop = dynamic_stop(
                &indicators.ema_short,
                &indicators.ema_medium,
                &indicators.ema_long,
                params,
                days_held,
                i,
            );
            flags.exit = exit_ready(bar.close, stop);
            flags.tp1 = tp_ready(&bars, params, pos.entry_price, params.tp1_pct, i);
            flags.tp2 = tp_ready(&bars, params, pos.entry_price, params.tp2_pct, i);
        }
        PositionState::Flat => {
            flags.entry = entry_ready(&bars, &indicators, params, i);
        }
    }

    let event = state.apply(flags, ticker, bar.date, bar.close);
    Ok((state, event))
}
