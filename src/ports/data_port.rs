//! Market data access port.

use crate::domain::error::TrendscanError;
use crate::domain::ohlcv::Bar;
use chrono::NaiveDate;
use std::fmt;

/// Bar granularity of a fetched series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Daily,
    Weekly,
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Daily => write!(f, "daily"),
            Interval::Weekly => write!(f, "weekly"),
        }
    }
}

/// Fetches OHLCV history.
///
/// Contract: `DataUnavailable` when the ticker is unknown or the source is
/// unreachable; an empty Vec (not an error) when the ticker exists but has
/// no bars in range. Returned bars are ordered by date.
pub trait DataPort {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        interval: Interval,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, TrendscanError>;
}
