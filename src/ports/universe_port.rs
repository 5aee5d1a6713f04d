//! Universe provider port.

use crate::domain::error::TrendscanError;

/// Supplies the ticker universe: deduplicated, order-stable for
/// reproducibility.
pub trait UniversePort {
    fn list_tickers(&self) -> Result<Vec<String>, TrendscanError>;
}
