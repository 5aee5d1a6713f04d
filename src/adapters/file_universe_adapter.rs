//! File universe adapter: reads the ticker list from a CSV file.
//!
//! Expects a `ticker` column (header row); remaining columns are ignored.
//! The list is normalized and deduplicated, order preserved.

use crate::domain::error::TrendscanError;
use crate::domain::universe::dedup_tickers;
use crate::ports::universe_port::UniversePort;
use std::path::PathBuf;

pub struct FileUniverseAdapter {
    path: PathBuf,
}

impl FileUniverseAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl UniversePort for FileUniverseAdapter {
    fn list_tickers(&self) -> Result<Vec<String>, TrendscanError> {
        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|e| TrendscanError::Io(
                std::io::Error::other(format!("failed to open {}: {}", self.path.display(), e)),
            ))?;

        let headers = reader
            .headers()
            .map_err(|e| TrendscanError::Io(std::io::Error::other(e.to_string())))?;
        let ticker_column = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case("ticker"))
            .unwrap_or(0);

        let mut raw = Vec::new();
        for result in reader.records() {
            let record =
                result.map_err(|e| TrendscanError::Io(std::io::Error::other(e.to_string())))?;
            if let Some(value) = record.get(ticker_column) {
                raw.push(value.to_string());
            }
        }

        Ok(dedup_tickers(raw))
    }
}
