//! CSV file data adapter.
//!
//! One file per ticker and interval under a base directory:
//! `{TICKER}_{interval}.csv` with columns date,open,high,low,close,volume.

use crate::domain::error::TrendscanError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::{DataPort, Interval};
use chrono::NaiveDate;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str, interval: Interval) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", ticker, interval))
    }
}

fn field<'a>(
    record: &'a csv::StringRecord,
    index: usize,
    name: &str,
    ticker: &str,
) -> Result<&'a str, TrendscanError> {
    record.get(index).ok_or_else(|| TrendscanError::MalformedSeries {
        ticker: ticker.to_string(),
        reason: format!("missing {} column", name),
    })
}

fn parse_price(value: &str, name: &str, ticker: &str) -> Result<f64, TrendscanError> {
    value.parse().map_err(|e| TrendscanError::MalformedSeries {
        ticker: ticker.to_string(),
        reason: format!("invalid {} value: {}", name, e),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        interval: Interval,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, TrendscanError> {
        let path = self.csv_path(ticker, interval);
        let mut reader =
            csv::Reader::from_path(&path).map_err(|e| TrendscanError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: format!("failed to open {}: {}", path.display(), e),
            })?;

        let mut bars = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| TrendscanError::MalformedSeries {
                ticker: ticker.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = field(&record, 0, "date", ticker)?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                TrendscanError::MalformedSeries {
                    ticker: ticker.to_string(),
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let open = parse_price(field(&record, 1, "open", ticker)?, "open", ticker)?;
            let high = parse_price(field(&record, 2, "high", ticker)?, "high", ticker)?;
            let low = parse_price(field(&record, 3, "low", ticker)?, "low", ticker)?;
            let close = parse_price(field(&record, 4, "close", ticker)?, "close", ticker)?;
            let volume: i64 = field(&record, 5, "volume", ticker)?.parse().map_err(|e| {
                TrendscanError::MalformedSeries {
                    ticker: ticker.to_string(),
                    reason: format!("invalid volume value: {}", e),
                }
            })?;

            bars.push(Bar {
                ticker: ticker.to_string(),
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}
