//! Configuration validation, checked before a run starts.

use crate::domain::error::TrendscanError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(TrendscanError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }

    for key in ["entry_interval", "exit_interval"] {
        if let Some(value) = config.get_string("backtest", key) {
            if value != "daily" && value != "weekly" {
                return Err(TrendscanError::ConfigInvalid {
                    section: "backtest".to_string(),
                    key: key.to_string(),
                    reason: "interval must be 'daily' or 'weekly'".to_string(),
                });
            }
        }
    }
    Ok(())
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, TrendscanError> {
    match value {
        None => Err(TrendscanError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            TrendscanError::ConfigInvalid {
                section: "backtest".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }
        }),
    }
}

pub fn validate_scan_config(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    let history_days = config.get_int("scan", "history_days", 365);
    if history_days <= 0 {
        return Err(TrendscanError::ConfigInvalid {
            section: "scan".to_string(),
            key: "history_days".to_string(),
            reason: "history_days must be positive".to_string(),
        });
    }
    Ok(())
}

pub fn validate_universe_config(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    let tickers = config.get_string("universe", "tickers");
    let file = config.get_string("universe", "file");

    match (tickers, file) {
        (Some(t), _) if !t.trim().is_empty() => Ok(()),
        (_, Some(f)) if !f.trim().is_empty() => Ok(()),
        _ => Err(TrendscanError::ConfigMissing {
            section: "universe".to_string(),
            key: "tickers".to_string(),
        }),
    }
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    validate_lookbacks(config)?;
    validate_thresholds(config)?;
    validate_take_profit(config)?;
    validate_hold_tiers(config)?;
    Ok(())
}

fn validate_lookbacks(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    for (key, default) in [
        ("ema_short", 50),
        ("ema_medium", 100),
        ("ema_long", 200),
        ("sma_fast", 20),
        ("sma_slow", 50),
        ("sma_trend", 200),
        ("adx_period", 14),
        ("atr_period", 14),
        ("slope_lookback", 10),
    ] {
        let value = config.get_int("strategy", key, default);
        if value <= 0 {
            return Err(TrendscanError::ConfigInvalid {
                section: "strategy".to_string(),
                key: key.to_string(),
                reason: format!("{} must be positive", key),
            });
        }
    }
    Ok(())
}

fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    for (key, default) in [
        ("adx_min", 20.0),
        ("spread_min", 0.01),
        ("atr_ratio_min", 0.005),
    ] {
        let value = config.get_double("strategy", key, default);
        if value < 0.0 {
            return Err(TrendscanError::ConfigInvalid {
                section: "strategy".to_string(),
                key: key.to_string(),
                reason: format!("{} must be non-negative", key),
            });
        }
    }
    Ok(())
}

fn validate_take_profit(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    let tp1 = config.get_double("strategy", "tp1_pct", 0.35);
    let tp2 = config.get_double("strategy", "tp2_pct", 0.80);

    if tp1 <= 0.0 {
        return Err(TrendscanError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "tp1_pct".to_string(),
            reason: "tp1_pct must be positive".to_string(),
        });
    }
    if tp2 <= tp1 {
        return Err(TrendscanError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "tp2_pct".to_string(),
            reason: "tp2_pct must exceed tp1_pct".to_string(),
        });
    }

    if let Some(reference) = config.get_string("strategy", "tp_reference") {
        match reference.as_str() {
            "entry" | "prev_close" => {}
            _ => {
                return Err(TrendscanError::ConfigInvalid {
                    section: "strategy".to_string(),
                    key: "tp_reference".to_string(),
                    reason: "tp_reference must be 'entry' or 'prev_close'".to_string(),
                });
            }
        }
    }
    Ok(())
}

fn validate_hold_tiers(config: &dyn ConfigPort) -> Result<(), TrendscanError> {
    let short_max = config.get_int("strategy", "hold_short_max", 50);
    let medium_max = config.get_int("strategy", "hold_medium_max", 100);

    if short_max <= 0 || medium_max <= short_max {
        return Err(TrendscanError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "hold_medium_max".to_string(),
            reason: "hold tiers must satisfy 0 < hold_short_max < hold_medium_max".to_string(),
        });
    }

    let cooldown = config.get_int("strategy", "cooldown_bars", 15);
    if cooldown < 0 {
        return Err(TrendscanError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "cooldown_bars".to_string(),
            reason: "cooldown_bars must be non-negative".to_string(),
        });
    }
    Ok(())
}
