//! OHLCV bar representation and series validation.

use crate::domain::error::TrendscanError;
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct Bar {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Check the series invariants: strictly increasing dates, finite prices,
/// non-negative volume. A violation is fatal for the ticker, not the run.
pub fn validate_series(bars: &[Bar]) -> Result<(), TrendscanError> {
    let ticker = match bars.first() {
        Some(bar) => bar.ticker.clone(),
        None => return Ok(()),
    };

    for (i, bar) in bars.iter().enumerate() {
        if i > 0 && bar.date <= bars[i - 1].date {
            return Err(TrendscanError::MalformedSeries {
                ticker,
                reason: format!(
                    "dates not strictly increasing at index {} ({} after {})",
                    i,
                    bar.date,
                    bars[i - 1].date
                ),
            });
        }
        for (name, v) in [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(TrendscanError::MalformedSeries {
                    ticker,
                    reason: format!("non-finite or negative {} at {}", name, bar.date),
                });
            }
        }
        if bar.volume < 0 {
            return Err(TrendscanError::MalformedSeries {
                ticker,
                reason: format!("negative volume at {}", bar.date),
            });
        }
    }
    Ok(())
}
