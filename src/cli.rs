//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::console_notify_adapter::ConsoleNotifyAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::file_universe_adapter::FileUniverseAdapter;
use crate::adapters::json_store_adapter::JsonStoreAdapter;
use crate::domain::backtest::{run_universe_backtest, BacktestConfig};
use crate::domain::config_validation::{
    validate_backtest_config, validate_scan_config, validate_strategy_config,
    validate_universe_config,
};
use crate::domain::error::TrendscanError;
use crate::domain::report::{format_notification, RunReport};
use crate::domain::scan::{run_scan, ScanConfig};
use crate::domain::signal::SignalKind;
use crate::domain::strategy::{StrategyParams, TpReference};
use crate::domain::universe::parse_tickers;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::Interval;
use crate::ports::notify_port::NotifyPort;
use crate::ports::report_port::ReportPort;
use crate::ports::store_port::StorePort;
use crate::ports::universe_port::UniversePort;

#[derive(Parser, Debug)]
#[command(name = "trendscan", about = "Trend-following signal scanner and backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan the universe for signals on the latest bar
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the dual-timeframe backtest over the full history
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Scan {
            config,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_scan_command(&config, output.as_ref())
            }
        }
        Command::Backtest {
            config,
            ticker,
            output,
        } => run_backtest_command(&config, ticker.as_deref(), output.as_ref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TrendscanError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Build StrategyParams from the [strategy] section; absent keys keep their
/// documented defaults.
pub fn build_strategy_params(config: &dyn ConfigPort) -> StrategyParams {
    let defaults = StrategyParams::default();

    let tp_reference = match config.get_string("strategy", "tp_reference").as_deref() {
        Some("prev_close") => TpReference::PrevClose,
        _ => TpReference::Entry,
    };

    StrategyParams {
        ema_short: config.get_int("strategy", "ema_short", defaults.ema_short as i64) as usize,
        ema_medium: config.get_int("strategy", "ema_medium", defaults.ema_medium as i64) as usize,
        ema_long: config.get_int("strategy", "ema_long", defaults.ema_long as i64) as usize,
        sma_fast: config.get_int("strategy", "sma_fast", defaults.sma_fast as i64) as usize,
        sma_slow: config.get_int("strategy", "sma_slow", defaults.sma_slow as i64) as usize,
        sma_trend: config.get_int("strategy", "sma_trend", defaults.sma_trend as i64) as usize,
        adx_period: config.get_int("strategy", "adx_period", defaults.adx_period as i64) as usize,
        atr_period: config.get_int("strategy", "atr_period", defaults.atr_period as i64) as usize,
        adx_min: config.get_double("strategy", "adx_min", defaults.adx_min),
        slope_lookback: config.get_int("strategy", "slope_lookback", defaults.slope_lookback as i64)
            as usize,
        spread_min: config.get_double("strategy", "spread_min", defaults.spread_min),
        atr_ratio_min: config.get_double("strategy", "atr_ratio_min", defaults.atr_ratio_min),
        tp_reference,
        tp1_pct: config.get_double("strategy", "tp1_pct", defaults.tp1_pct),
        tp2_pct: config.get_double("strategy", "tp2_pct", defaults.tp2_pct),
        hold_short_max: config.get_int("strategy", "hold_short_max", defaults.hold_short_max as i64)
            as usize,
        hold_medium_max: config
            .get_int("strategy", "hold_medium_max", defaults.hold_medium_max as i64)
            as usize,
        cooldown_bars: config.get_int("strategy", "cooldown_bars", defaults.cooldown_bars as i64)
            as usize,
        momentum_filter: config.get_bool("strategy", "momentum_filter", defaults.momentum_filter),
        roc_short: config.get_int("strategy", "roc_short", defaults.roc_short as i64) as usize,
        roc_medium: config.get_int("strategy", "roc_medium", defaults.roc_medium as i64) as usize,
        roc_long: config.get_int("strategy", "roc_long", defaults.roc_long as i64) as usize,
        roc_short_min: config.get_double("strategy", "roc_short_min", defaults.roc_short_min),
        roc_medium_min: config.get_double("strategy", "roc_medium_min", defaults.roc_medium_min),
        roc_long_min: config.get_double("strategy", "roc_long_min", defaults.roc_long_min),
        breakout_filter: config.get_bool("strategy", "breakout_filter", defaults.breakout_filter),
        high_window: config.get_int("strategy", "high_window", defaults.high_window as i64) as usize,
        high_proximity: config.get_double("strategy", "high_proximity", defaults.high_proximity),
        volume_window: config.get_int("strategy", "volume_window", defaults.volume_window as i64)
            as usize,
        volume_surge: config.get_double("strategy", "volume_surge", defaults.volume_surge),
        quality_filter: config.get_bool("strategy", "quality_filter", defaults.quality_filter),
        min_price: config.get_double("strategy", "min_price", defaults.min_price),
        min_avg_volume: config.get_double("strategy", "min_avg_volume", defaults.min_avg_volume),
    }
}

/// Resolve the ticker universe from `[universe] tickers` or `[universe] file`.
pub fn resolve_universe(config: &dyn ConfigPort) -> Result<Vec<String>, TrendscanError> {
    if let Some(list) = config.get_string("universe", "tickers") {
        let tickers = parse_tickers(&list);
        if !tickers.is_empty() {
            return Ok(tickers);
        }
    }
    if let Some(file) = config.get_string("universe", "file") {
        return FileUniverseAdapter::new(PathBuf::from(file)).list_tickers();
    }
    Err(TrendscanError::ConfigMissing {
        section: "universe".into(),
        key: "tickers".into(),
    })
}

fn data_adapter(config: &dyn ConfigPort) -> Result<CsvAdapter, TrendscanError> {
    let csv_dir = config.get_string("data", "csv_dir").ok_or_else(|| {
        TrendscanError::ConfigMissing {
            section: "data".into(),
            key: "csv_dir".into(),
        }
    })?;
    Ok(CsvAdapter::new(PathBuf::from(csv_dir)))
}

fn run_scan_command(config_path: &PathBuf, output_override: Option<&PathBuf>) -> ExitCode {
    // Stage 1: load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    for validation in [
        validate_scan_config(&config),
        validate_universe_config(&config),
        validate_strategy_config(&config),
    ] {
        if let Err(e) = validation {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    // Stage 2: resolve strategy, universe, adapters
    let params = build_strategy_params(&config);
    let tickers = match resolve_universe(&config) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let data = match data_adapter(&config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let store_path = config
        .get_string("scan", "positions_file")
        .unwrap_or_else(|| "positions.json".to_string());
    let store = JsonStoreAdapter::new(PathBuf::from(store_path));

    // Stage 3: scan window ending today
    let history_days = config.get_int("scan", "history_days", 365);
    let end_date = Local::now().date_naive();
    let scan_config = ScanConfig {
        start_date: end_date - chrono::Duration::days(history_days),
        end_date,
    };

    eprintln!(
        "Scanning {} tickers ({} to {})",
        tickers.len(),
        scan_config.start_date,
        scan_config.end_date,
    );

    // Stage 4: run
    let outcome = match run_scan(&data, &store, &tickers, &params, &scan_config) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 5: persist state; a store failure must not discard the signals
    if let Err(e) = store.save(&outcome.positions) {
        eprintln!("warning: failed to save positions ({e})");
    }

    // Stage 6: export and notify
    let output = output_override.cloned().unwrap_or_else(|| {
        PathBuf::from(
            config
                .get_string("scan", "output")
                .unwrap_or_else(|| "signals.csv".to_string()),
        )
    });
    let report_adapter = CsvReportAdapter::new();
    if let Err(e) = report_adapter.export(&outcome.report.events, &output) {
        eprintln!("warning: failed to export signals ({e})");
    } else {
        eprintln!("Signals written to: {}", output.display());
    }

    if !outcome.report.missing.is_empty() {
        let missing_output = PathBuf::from(
            config
                .get_string("scan", "missing_output")
                .unwrap_or_else(|| "missing.csv".to_string()),
        );
        if let Err(e) = report_adapter.export_missing(&outcome.report.missing, &missing_output) {
            eprintln!("warning: failed to export missing tickers ({e})");
        }
    }

    let notifier = ConsoleNotifyAdapter::new();
    if let Err(e) = notifier.send(&format_notification(&outcome.report.events)) {
        eprintln!("warning: notification failed ({e})");
    }

    print_summary(&outcome.report);
    ExitCode::SUCCESS
}

fn run_backtest_command(
    config_path: &PathBuf,
    ticker_override: Option<&str>,
    output_override: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Err(e) = validate_backtest_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_strategy_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 2: strategy, range, universe
    let params = build_strategy_params(&config);
    let bt_config = match build_backtest_config(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let tickers: Vec<String> = match ticker_override {
        Some(t) => vec![t.to_uppercase()],
        None => {
            if let Err(e) = validate_universe_config(&config) {
                eprintln!("error: {e}");
                return (&e).into();
            }
            match resolve_universe(&config) {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("error: {e}");
                    return (&e).into();
                }
            }
        }
    };

    let data = match data_adapter(&config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Backtesting {} tickers, {} to {}",
        tickers.len(),
        bt_config.start_date,
        bt_config.end_date,
    );

    // Stage 3: run
    let report = run_universe_backtest(&data, &tickers, &params, &bt_config);

    // Stage 4: export
    let output = output_override.cloned().unwrap_or_else(|| {
        PathBuf::from(
            config
                .get_string("backtest", "output")
                .unwrap_or_else(|| "backtest_signals.csv".to_string()),
        )
    });
    let report_adapter = CsvReportAdapter::new();
    if let Err(e) = report_adapter.export(&report.events, &output) {
        eprintln!("error: failed to export signals ({e})");
        return (&e).into();
    }
    eprintln!("Signals written to: {}", output.display());

    if !report.missing.is_empty() {
        let missing_output = PathBuf::from(
            config
                .get_string("backtest", "missing_output")
                .unwrap_or_else(|| "missing.csv".to_string()),
        );
        if let Err(e) = report_adapter.export_missing(&report.missing, &missing_output) {
            eprintln!("warning: failed to export missing tickers ({e})");
        }
    }

    print_summary(&report);
    print_backtest_stats(&report);
    ExitCode::SUCCESS
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, TrendscanError> {
    let start = parse_config_date(config, "start_date")?;
    let end = parse_config_date(config, "end_date")?;
    let mut bt_config = BacktestConfig::new(start, end);
    bt_config.entry_interval =
        parse_interval(config, "entry_interval", bt_config.entry_interval)?;
    bt_config.exit_interval = parse_interval(config, "exit_interval", bt_config.exit_interval)?;
    Ok(bt_config)
}

fn parse_interval(
    config: &dyn ConfigPort,
    key: &str,
    default: Interval,
) -> Result<Interval, TrendscanError> {
    match config.get_string("backtest", key).as_deref() {
        None => Ok(default),
        Some("daily") => Ok(Interval::Daily),
        Some("weekly") => Ok(Interval::Weekly),
        Some(_) => Err(TrendscanError::ConfigInvalid {
            section: "backtest".into(),
            key: key.into(),
            reason: "interval must be 'daily' or 'weekly'".into(),
        }),
    }
}

fn parse_config_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, TrendscanError> {
    let value = config
        .get_string("backtest", key)
        .ok_or_else(|| TrendscanError::ConfigMissing {
            section: "backtest".into(),
            key: key.into(),
        })?;
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| TrendscanError::ConfigInvalid {
        section: "backtest".into(),
        key: key.into(),
        reason: "invalid date format (expected YYYY-MM-DD)".into(),
    })
}

fn print_summary(report: &RunReport) {
    eprintln!("\n=== Run Summary ===");
    eprintln!("Signals:          {}", report.events.len());
    for (kind, label) in [
        (SignalKind::Entry, "  ENTRY"),
        (SignalKind::Tp1, "  TP1"),
        (SignalKind::Tp2, "  TP2"),
        (SignalKind::Exit, "  EXIT"),
    ] {
        let count = report.events.iter().filter(|e| e.kind == kind).count();
        if count > 0 {
            eprintln!("{}:          {}", label, count);
        }
    }
    if !report.missing.is_empty() {
        eprintln!("Missing data:     {}", report.missing.len());
    }
    if !report.skipped.is_empty() {
        eprintln!("Short history:    {}", report.skipped.len());
    }
    if !report.failed.is_empty() {
        eprintln!("Failed:           {}", report.failed.len());
    }
}

fn print_backtest_stats(report: &RunReport) {
    let returns: Vec<f64> = report
        .events
        .iter()
        .filter_map(|e| e.return_pct)
        .collect();
    if returns.is_empty() {
        return;
    }

    let wins = returns.iter().filter(|&&r| r > 0.0).count();
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;

    eprintln!("\n=== Closed Trades ===");
    eprintln!("Trades:           {}", returns.len());
    eprintln!(
        "Win rate:         {:.1}%",
        wins as f64 / returns.len() as f64 * 100.0
    );
    eprintln!("Mean return:      {:.2}%", mean * 100.0);
}

pub fn run_dry_run(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    for validation in [
        validate_scan_config(&config),
        validate_universe_config(&config),
        validate_strategy_config(&config),
    ] {
        if let Err(e) = validation {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }
    eprintln!("Config validated successfully");

    let params = build_strategy_params(&config);
    print_params(&params);

    match resolve_universe(&config) {
        Ok(tickers) => {
            eprintln!("\nUniverse: {} tickers", tickers.len());
            eprintln!("  {}", tickers.join(", "));
        }
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_strategy_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let params = build_strategy_params(&config);
    print_params(&params);

    eprintln!("\nStrategy configuration is valid.");
    ExitCode::SUCCESS
}

fn print_params(params: &StrategyParams) {
    eprintln!("\nStrategy parameters:");
    eprintln!(
        "  EMAs: {}/{}/{}  SMAs: {}/{}/{}",
        params.ema_short,
        params.ema_medium,
        params.ema_long,
        params.sma_fast,
        params.sma_slow,
        params.sma_trend,
    );
    eprintln!(
        "  ADX({}) > {}  slope lookback {}  spread > {}  ATR({})/close > {}",
        params.adx_period,
        params.adx_min,
        params.slope_lookback,
        params.spread_min,
        params.atr_period,
        params.atr_ratio_min,
    );
    eprintln!(
        "  TP: +{:.0}% / +{:.0}% vs {}",
        params.tp1_pct * 100.0,
        params.tp2_pct * 100.0,
        match params.tp_reference {
            TpReference::Entry => "entry price",
            TpReference::PrevClose => "previous close",
        },
    );
    eprintln!(
        "  Stop tiers: <= {} bars EMA{}, <= {} bars EMA{}, after EMA{}",
        params.hold_short_max,
        params.ema_long,
        params.hold_medium_max,
        params.ema_medium,
        params.ema_short,
    );
    eprintln!("  Cooldown: {} bars", params.cooldown_bars);
    if params.momentum_filter {
        eprintln!(
            "  Momentum screen: ROC{} > {}, ROC{} > {}, ROC{} > {}",
            params.roc_short,
            params.roc_short_min,
            params.roc_medium,
            params.roc_medium_min,
            params.roc_long,
            params.roc_long_min,
        );
    }
    if params.breakout_filter {
        eprintln!(
            "  Breakout screen: close >= {} x {}-bar high, volume >= {} x avg",
            params.high_proximity, params.high_window, params.volume_surge,
        );
    }
    if params.quality_filter {
        eprintln!(
            "  Quality screen: price >= {}, avg volume >= {}",
            params.min_price, params.min_avg_volume,
        );
    }
}
