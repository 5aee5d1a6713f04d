//! JSON position store adapter.
//!
//! Persists the ticker → state mapping as pretty-printed JSON. A missing
//! file means a fresh start (everything flat); a corrupt file is logged and
//! treated the same way rather than aborting the scan.

use crate::domain::error::TrendscanError;
use crate::domain::position::PositionState;
use crate::ports::store_port::StorePort;
use std::collections::HashMap;
use std::path::PathBuf;

pub struct JsonStoreAdapter {
    path: PathBuf,
}

impl JsonStoreAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_all(&self) -> HashMap<String, PositionState> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return HashMap::new(),
        };
        match serde_json::from_str(&content) {
            Ok(positions) => positions,
            Err(e) => {
                eprintln!(
                    "warning: position store {} is corrupt ({}), starting flat",
                    self.path.display(),
                    e
                );
                HashMap::new()
            }
        }
    }
}

impl StorePort for JsonStoreAdapter {
    fn load(&self, tickers: &[String]) -> Result<HashMap<String, PositionState>, TrendscanError> {
        let stored = self.read_all();
        Ok(tickers
            .iter()
            .map(|t| (t.clone(), stored.get(t).cloned().unwrap_or_default()))
            .collect())
    }

    fn save(&self, positions: &HashMap<String, PositionState>) -> Result<(), TrendscanError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| TrendscanError::Store {
                    reason: format!("failed to create {}: {}", parent.display(), e),
                })?;
            }
        }
        let json = serde_json::to_string_pretty(positions).map_err(|e| TrendscanError::Store {
            reason: e.to_string(),
        })?;
        std::fs::write(&self.path, json).map_err(|e| TrendscanError::Store {
            reason: format!("failed to write {}: {}", self.path.display(), e),
        })
    }
}
