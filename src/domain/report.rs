//! Run outcome aggregation and notification text.

use crate::domain::error::TrendscanError;
use crate::domain::signal::{SignalEvent, SignalKind};

/// The outcome of a universe run: every emitted event plus the tickers that
/// could not be processed, bucketed by cause.
#[derive(Debug, Default)]
pub struct RunReport {
    pub events: Vec<SignalEvent>,
    /// DataUnavailable: no data for the ticker.
    pub missing: Vec<String>,
    /// InsufficientHistory: too few bars; not an error visible to the user.
    pub skipped: Vec<String>,
    /// MalformedSeries and anything else fatal for the ticker.
    pub failed: Vec<String>,
}

impl RunReport {
    /// Record a per-ticker failure and keep going. InsufficientHistory is a
    /// silent skip; everything else is logged with the ticker identity.
    pub fn record_failure(&mut self, ticker: &str, err: &TrendscanError) {
        match err {
            TrendscanError::DataUnavailable { .. } => {
                eprintln!("warning: skipping {} ({})", ticker, err);
                self.missing.push(ticker.to_string());
            }
            TrendscanError::InsufficientHistory { .. } => {
                self.skipped.push(ticker.to_string());
            }
            _ => {
                eprintln!("warning: {} failed ({})", ticker, err);
                self.failed.push(ticker.to_string());
            }
        }
    }

    pub fn processed_cleanly(&self) -> bool {
        self.missing.is_empty() && self.failed.is_empty()
    }
}

/// Build the notification text: one section per signal kind, tickers one
/// per line, or a no-signals line.
pub fn format_notification(events: &[SignalEvent]) -> String {
    if events.is_empty() {
        return "No new signals.\n".to_string();
    }

    let mut text = String::from("New trading signals\n\n");
    for (kind, heading) in [
        (SignalKind::Entry, "ENTRY"),
        (SignalKind::Tp1, "TP1"),
        (SignalKind::Tp2, "TP2"),
        (SignalKind::Exit, "EXIT"),
    ] {
        let tickers: Vec<&str> = events
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.ticker.as_str())
            .collect();
        if tickers.is_empty() {
            continue;
        }
        text.push_str(heading);
        text.push('\n');
        for ticker in tickers {
            text.push_str(ticker);
            text.push('\n');
        }
        text.push('\n');
    }
    text
}
