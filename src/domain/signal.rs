//! Signal events emitted by the position state machine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    Entry,
    Exit,
    Tp1,
    Tp2,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Entry => write!(f, "ENTRY"),
            SignalKind::Exit => write!(f, "EXIT"),
            SignalKind::Tp1 => write!(f, "TP1"),
            SignalKind::Tp2 => write!(f, "TP2"),
        }
    }
}

/// One emitted lifecycle event. `return_pct` is the realized fractional
/// return, present on EXIT only.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalEvent {
    pub ticker: String,
    pub kind: SignalKind,
    pub date: NaiveDate,
    pub price: f64,
    pub return_pct: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_kind_display() {
        assert_eq!(SignalKind::Entry.to_string(), "ENTRY");
        assert_eq!(SignalKind::Exit.to_string(), "EXIT");
        assert_eq!(SignalKind::Tp1.to_string(), "TP1");
        assert_eq!(SignalKind::Tp2.to_string(), "TP2");
    }

    #[test]
    fn signal_event_fields() {
        let event = SignalEvent {
            ticker: "AAPL".into(),
            kind: SignalKind::Exit,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            price: 120.0,
            return_pct: Some(0.2),
        };
        assert_eq!(event.ticker, "AAPL");
        assert_eq!(event.kind, SignalKind::Exit);
        assert_eq!(event.return_pct, Some(0.2));
    }
}
