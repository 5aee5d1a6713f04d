//! CSV report adapter: writes the signal table and the missing-ticker list.

use crate::domain::error::TrendscanError;
use crate::domain::signal::SignalEvent;
use crate::ports::report_port::ReportPort;
use std::path::Path;

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn report_err(e: impl std::fmt::Display) -> TrendscanError {
    TrendscanError::Report {
        reason: e.to_string(),
    }
}

impl ReportPort for CsvReportAdapter {
    fn export(&self, events: &[SignalEvent], path: &Path) -> Result<(), TrendscanError> {
        let mut writer = csv::Writer::from_path(path).map_err(report_err)?;

        writer
            .write_record(["ticker", "signal", "date", "price", "return_pct"])
            .map_err(report_err)?;

        for event in events {
            writer
                .write_record([
                    event.ticker.clone(),
                    event.kind.to_string(),
                    event.date.format("%Y-%m-%d").to_string(),
                    format!("{:.4}", event.price),
                    event
                        .return_pct
                        .map(|r| format!("{:.4}", r))
                        .unwrap_or_default(),
                ])
                .map_err(report_err)?;
        }

        writer.flush().map_err(report_err)?;
        Ok(())
    }

    fn export_missing(&self, tickers: &[String], path: &Path) -> Result<(), TrendscanError> {
        let mut writer = csv::Writer::from_path(path).map_err(report_err)?;
        writer.write_record(["ticker"]).map_err(report_err)?;
        for ticker in tickers {
            writer.write_record([ticker.as_str()]).map_err(report_err)?;
        }
        writer.flush().map_err(report_err)?;
        Ok(())
    }
}
