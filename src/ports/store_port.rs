//! Position store port.

use crate::domain::error::TrendscanError;
use crate::domain::position::PositionState;
use std::collections::HashMap;

/// Persists per-ticker position state between scan runs.
///
/// Contract: every requested ticker absent from storage loads as
/// `PositionState::Flat`. `save` replaces the stored mapping wholesale.
pub trait StorePort {
    fn load(&self, tickers: &[String]) -> Result<HashMap<String, PositionState>, TrendscanError>;

    fn save(&self, positions: &HashMap<String, PositionState>) -> Result<(), TrendscanError>;
}
