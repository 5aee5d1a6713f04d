//! Report export port.

use crate::domain::error::TrendscanError;
use crate::domain::signal::SignalEvent;
use std::path::Path;

/// Writes signal artifacts to disk.
///
/// Contract: exporting an empty event list still produces a valid,
/// correctly-columned artifact.
pub trait ReportPort {
    fn export(&self, events: &[SignalEvent], path: &Path) -> Result<(), TrendscanError>;

    /// Write the list of tickers that had no data this run.
    fn export_missing(&self, tickers: &[String], path: &Path) -> Result<(), TrendscanError>;
}
