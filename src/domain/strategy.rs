//! Strategy parameters.
//!
//! Every numeric threshold, lookback and preset switch of the rule set lives
//! here, so the historical strategy variants are configuration presets
//! rather than separate code paths. Defaults reproduce the reference
//! weekly-entry behavior.

/// Reference price for the take-profit checks.
///
/// `Entry` measures the gain against the recorded entry price (+35 %/+80 %
/// defaults); `PrevClose` measures bar-over-bar jumps (the +10 %/+20 %
/// screener variant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TpReference {
    Entry,
    PrevClose,
}

#[derive(Debug, Clone)]
pub struct StrategyParams {
    // moving-average lookbacks
    pub ema_short: usize,
    pub ema_medium: usize,
    pub ema_long: usize,
    pub sma_fast: usize,
    pub sma_slow: usize,
    pub sma_trend: usize,

    // trend and volatility gates
    pub adx_period: usize,
    pub atr_period: usize,
    pub adx_min: f64,
    pub slope_lookback: usize,
    pub spread_min: f64,
    pub atr_ratio_min: f64,

    // take profit
    pub tp_reference: TpReference,
    pub tp1_pct: f64,
    pub tp2_pct: f64,

    // exit stop rotation, measured in fine-timeframe bars held
    pub hold_short_max: usize,
    pub hold_medium_max: usize,

    // re-entry cooldown in coarse bars after an exit; 0 disables
    pub cooldown_bars: usize,

    // optional momentum screen (AND-ed onto entry when enabled)
    pub momentum_filter: bool,
    pub roc_short: usize,
    pub roc_medium: usize,
    pub roc_long: usize,
    pub roc_short_min: f64,
    pub roc_medium_min: f64,
    pub roc_long_min: f64,

    // optional breakout screen
    pub breakout_filter: bool,
    pub high_window: usize,
    pub high_proximity: f64,
    pub volume_window: usize,
    pub volume_surge: f64,

    // optional liquidity/price quality screen
    pub quality_filter: bool,
    pub min_price: f64,
    pub min_avg_volume: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            ema_short: 50,
            ema_medium: 100,
            ema_long: 200,
            sma_fast: 20,
            sma_slow: 50,
            sma_trend: 200,
            adx_period: 14,
            atr_period: 14,
            adx_min: 20.0,
            slope_lookback: 10,
            spread_min: 0.01,
            atr_ratio_min: 0.005,
            tp_reference: TpReference::Entry,
            tp1_pct: 0.35,
            tp2_pct: 0.80,
            hold_short_max: 50,
            hold_medium_max: 100,
            cooldown_bars: 15,
            momentum_filter: false,
            roc_short: 63,
            roc_medium: 126,
            roc_long: 252,
            roc_short_min: 0.15,
            roc_medium_min: 0.30,
            roc_long_min: 0.40,
            breakout_filter: false,
            high_window: 126,
            high_proximity: 0.98,
            volume_window: 50,
            volume_surge: 1.5,
            quality_filter: false,
            min_price: 3.0,
            min_avg_volume: 100_000.0,
        }
    }
}

impl StrategyParams {
    /// Bars required before the entry rule can ever fire. Series shorter
    /// than this are skipped as InsufficientHistory.
    pub fn required_history(&self) -> usize {
        let mut required = self.sma_trend + self.slope_lookback;
        if self.momentum_filter {
            required = required.max(self.roc_long + 1);
        }
        if self.breakout_filter {
            required = required.max(self.high_window).max(self.volume_window);
        }
        if self.quality_filter {
            required = required.max(self.volume_window);
        }
        required
    }
}
