//! Position lifecycle state machine.
//!
//! Per ticker: `Flat ⇄ Open`, with TP1/TP2 recorded as flags on the open
//! position. The entry price and date exist exactly when the position is
//! open; the enum carries that invariant.

use crate::domain::conditions::ConditionFlags;
use crate::domain::signal::{SignalEvent, SignalKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub tp1_done: bool,
    pub tp2_done: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PositionState {
    #[default]
    Flat,
    Open(OpenPosition),
}

impl PositionState {
    pub fn is_open(&self) -> bool {
        matches!(self, PositionState::Open(_))
    }

    pub fn open_position(&self) -> Option<&OpenPosition> {
        match self {
            PositionState::Flat => None,
            PositionState::Open(pos) => Some(pos),
        }
    }

    /// Advance the machine by one bar.
    ///
    /// Transition priority, first match wins (at most one event per bar):
    /// 1. flat + entry   → ENTRY, open the position, clear TP flags
    /// 2. open + exit    → EXIT with realized return, back to flat
    /// 3. open + tp2, TP1 already done, TP2 not yet → TP2
    /// 4. open + tp1, TP1 not yet                   → TP1
    pub fn apply(
        &mut self,
        flags: ConditionFlags,
        ticker: &str,
        date: NaiveDate,
        price: f64,
    ) -> Option<SignalEvent> {
        match self {
            PositionState::Flat => {
                if flags.entry {
                    *self = PositionState::Open(OpenPosition {
                        entry_price: price,
                        entry_date: date,
                        tp1_done: false,
                        tp2_done: false,
                    });
                    return Some(SignalEvent {
                        ticker: ticker.to_string(),
                        kind: SignalKind::Entry,
                        date,
                        price,
                        return_pct: None,
                    });
                }
                None
            }
            PositionState::Open(pos) => {
                if flags.exit {
                    let return_pct = price / pos.entry_price - 1.0;
                    *self = PositionState::Flat;
                    return Some(SignalEvent {
                        ticker: ticker.to_string(),
                        kind: SignalKind::Exit,
                        date,
                        price,
                        return_pct: Some(return_pct),
                    });
                }
                if flags.tp2 && pos.tp1_done && !pos.tp2_done {
                    pos.tp2_done = true;
                    return Some(SignalEvent {
                        ticker: ticker.to_string(),
                        kind: SignalKind::Tp2,
                        date,
                        price,
                        return_pct: None,
                    });
                }
                if flags.tp1 && !pos.tp1_done {
                    pos.tp1_done = true;
                    return Some(SignalEvent {
                        ticker: ticker.to_string(),
                        kind: SignalKind::Tp1,
                        date,
                        price,
                        return_pct: None,
                    });
                }
                None
            }
        }
    }

    /// End-of-history forced liquidation: close an open position at the
    /// final bar so every ENTRY pairs with exactly one EXIT.
    pub fn force_close(
        &mut self,
        ticker: &str,
        date: NaiveDate,
        price: f64,
    ) -> Option<SignalEvent> {
        self.apply(
            ConditionFlags {
                exit: true,
                ..Default::default()
            },
            ticker,
            date,
            price,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn entry_flags() -> ConditionFlags {
        ConditionFlags {
            entry: true,
            ..Default::default()
        }
    }

    #[test]
    fn entry_from_flat() {
        let mut state = PositionState::Flat;
        let event = state.apply(entry_flags(), "AAPL", date(1), 100.0).unwrap();

        assert_eq!(event.kind, SignalKind::Entry);
        assert_eq!(event.price, 100.0);
        assert!(event.return_pct.is_none());

        let pos = state.open_position().unwrap();
        assert_eq!(pos.entry_price, 100.0);
        assert_eq!(pos.entry_date, date(1));
        assert!(!pos.tp1_done);
        assert!(!pos.tp2_done);
    }

    #[test]
    fn entry_flag_ignored_while_open() {
        let mut state = PositionState::Flat;
        state.apply(entry_flags(), "AAPL", date(1), 100.0);

        let event = state.apply(entry_flags(), "AAPL", date(2), 110.0);
        assert!(event.is_none());
        assert_eq!(state.open_position().unwrap().entry_price, 100.0);
    }

    #[test]
    fn exit_emits_realized_return() {
        let mut state = PositionState::Flat;
        state.apply(entry_flags(), "AAPL", date(1), 100.0);

        let flags = ConditionFlags {
            exit: true,
            ..Default::default()
        };
        let event = state.apply(flags, "AAPL", date(5), 120.0).unwrap();

        assert_eq!(event.kind, SignalKind::Exit);
        assert!((event.return_pct.unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(state, PositionState::Flat);
    }

    #[test]
    fn exit_beats_tp_on_same_bar() {
        let mut state = PositionState::Flat;
        state.apply(entry_flags(), "AAPL", date(1), 100.0);

        let flags = ConditionFlags {
            exit: true,
            tp1: true,
            tp2: true,
            ..Default::default()
        };
        let event = state.apply(flags, "AAPL", date(2), 90.0).unwrap();
        assert_eq!(event.kind, SignalKind::Exit);
    }

    #[test]
    fn tp1_before_tp2() {
        let mut state = PositionState::Flat;
        state.apply(entry_flags(), "AAPL", date(1), 100.0);

        // tp2 alone cannot fire before tp1 has been recorded
        let tp2_only = ConditionFlags {
            tp2: true,
            ..Default::default()
        };
        assert!(state.apply(tp2_only, "AAPL", date(2), 190.0).is_none());

        let both = ConditionFlags {
            tp1: true,
            tp2: true,
            ..Default::default()
        };
        let event = state.apply(both, "AAPL", date(3), 190.0).unwrap();
        assert_eq!(event.kind, SignalKind::Tp1);

        let event = state.apply(both, "AAPL", date(4), 195.0).unwrap();
        assert_eq!(event.kind, SignalKind::Tp2);
    }

    #[test]
    fn tp_flags_are_idempotent() {
        let mut state = PositionState::Flat;
        state.apply(entry_flags(), "AAPL", date(1), 100.0);

        let tp1 = ConditionFlags {
            tp1: true,
            ..Default::default()
        };
        assert!(state.apply(tp1, "AAPL", date(2), 140.0).is_some());
        assert!(state.apply(tp1, "AAPL", date(3), 141.0).is_none());

        let tp2 = ConditionFlags {
            tp2: true,
            ..Default::default()
        };
        assert!(state.apply(tp2, "AAPL", date(4), 190.0).is_some());
        assert!(state.apply(tp2, "AAPL", date(5), 191.0).is_none());
    }

    #[test]
    fn exit_clears_tp_flags_for_next_cycle() {
        let mut state = PositionState::Flat;
        state.apply(entry_flags(), "AAPL", date(1), 100.0);
        state.apply(
            ConditionFlags {
                tp1: true,
                ..Default::default()
            },
            "AAPL",
            date(2),
            140.0,
        );
        state.apply(
            ConditionFlags {
                exit: true,
                ..Default::default()
            },
            "AAPL",
            date(3),
            130.0,
        );

        // new cycle: TP1 must be available again
        state.apply(entry_flags(), "AAPL", date(4), 100.0);
        let event = state
            .apply(
                ConditionFlags {
                    tp1: true,
                    ..Default::default()
                },
                "AAPL",
                date(5),
                140.0,
            )
            .unwrap();
        assert_eq!(event.kind, SignalKind::Tp1);
    }

    #[test]
    fn force_close_only_when_open() {
        let mut state = PositionState::Flat;
        assert!(state.force_close("AAPL", date(1), 100.0).is_none());

        state.apply(entry_flags(), "AAPL", date(1), 100.0);
        let event = state.force_close("AAPL", date(9), 90.0).unwrap();
        assert_eq!(event.kind, SignalKind::Exit);
        assert!((event.return_pct.unwrap() + 0.1).abs() < 1e-12);
        assert_eq!(state, PositionState::Flat);
    }

    #[test]
    fn no_event_when_no_flags() {
        let mut state = PositionState::Flat;
        assert!(state
            .apply(ConditionFlags::default(), "AAPL", date(1), 100.0)
            .is_none());

        state.apply(entry_flags(), "AAPL", date(1), 100.0);
        assert!(state
            .apply(ConditionFlags::default(), "AAPL", date(2), 101.0)
            .is_none());
    }

    #[test]
    fn serde_round_trip() {
        let state = PositionState::Open(OpenPosition {
            entry_price: 123.45,
            entry_date: date(7),
            tp1_done: true,
            tp2_done: false,
        });
        let json = serde_json::to_string(&state).unwrap();
        let back: PositionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);

        let flat_json = serde_json::to_string(&PositionState::Flat).unwrap();
        let back: PositionState = serde_json::from_str(&flat_json).unwrap();
        assert_eq!(back, PositionState::Flat);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_flags() -> impl Strategy<Value = ConditionFlags> {
            (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
                |(entry, exit, tp1, tp2)| ConditionFlags {
                    entry,
                    exit,
                    tp1,
                    tp2,
                },
            )
        }

        proptest! {
            /// The walk never leaves the transition table: entries and exits
            /// strictly alternate, at most one event per bar, TP2 never
            /// precedes TP1 within a cycle.
            #[test]
            fn state_walk_stays_in_table(flag_seq in proptest::collection::vec(arb_flags(), 0..200)) {
                let mut state = PositionState::Flat;
                let mut open = false;
                let mut tp1_seen = false;
                let mut entries = 0usize;
                let mut exits = 0usize;

                for (i, flags) in flag_seq.into_iter().enumerate() {
                    let was_open = open;
                    let event = state.apply(
                        flags,
                        "T",
                        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64),
                        100.0 + i as f64,
                    );

                    if let Some(event) = event {
                        match event.kind {
                            SignalKind::Entry => {
                                prop_assert!(!was_open);
                                open = true;
                                tp1_seen = false;
                                entries += 1;
                            }
                            SignalKind::Exit => {
                                prop_assert!(was_open);
                                open = false;
                                exits += 1;
                            }
                            SignalKind::Tp1 => {
                                prop_assert!(was_open);
                                prop_assert!(!tp1_seen);
                                tp1_seen = true;
                            }
                            SignalKind::Tp2 => {
                                prop_assert!(was_open);
                                prop_assert!(tp1_seen);
                            }
                        }
                    }
                    prop_assert_eq!(state.is_open(), open);
                }

                prop_assert!(entries == exits || entries == exits + 1);
            }
        }
    }
}
