//! History rollup over persisted calculations.
//!
//! The store hands back records newest-first. [`HistoryRollup::series`]
//! converts them into trend points and, for [`SeriesOrder::Chronological`],
//! reverses them so a left-to-right chart reads oldest to newest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use homewatt_types::CalculationRecord;

use crate::error::{Error, Result};
use crate::traits::CalculationStore;

/// Number of calculations in the recent-history view.
pub const HISTORY_LIMIT: u32 = 10;

/// Ordering of a trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesOrder {
    /// Oldest first.
    #[default]
    Chronological,
    /// Newest first, as returned by the store.
    NewestFirst,
}

impl fmt::Display for SeriesOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesOrder::Chronological => write!(f, "chronological"),
            SeriesOrder::NewestFirst => write!(f, "newest"),
        }
    }
}

impl FromStr for SeriesOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chronological" | "oldest" | "asc" => Ok(SeriesOrder::Chronological),
            "newest" | "newest_first" | "desc" => Ok(SeriesOrder::NewestFirst),
            other => Err(Error::Validation(homewatt_types::ValidationError::UnknownOrder {
                value: other.to_string(),
                expected: "chronological or newest",
            })),
        }
    }
}

/// One point on the consumption trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    /// When the calculation was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Daily consumption in kWh.
    pub consumption: f64,
}

/// Map newest-first records to trend points in the requested order.
pub fn trend_series(records: &[CalculationRecord], order: SeriesOrder) -> Vec<TrendPoint> {
    let points = records.iter().map(|r| TrendPoint {
        date: r.created_at,
        consumption: r.total_consumption,
    });
    match order {
        SeriesOrder::NewestFirst => points.collect(),
        SeriesOrder::Chronological => points.rev().collect(),
    }
}

/// Summary over a set of calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    /// Number of calculations.
    pub count: usize,
    /// Mean daily consumption.
    pub average: f64,
    /// Lowest daily consumption.
    pub min: f64,
    /// Highest daily consumption.
    pub max: f64,
}

/// Summarize calculations, or `None` if there are none.
pub fn summarize(records: &[CalculationRecord]) -> Option<HistoryStats> {
    if records.is_empty() {
        return None;
    }
    let totals = records.iter().map(|r| r.total_consumption);
    let sum: f64 = totals.clone().sum();
    Some(HistoryStats {
        count: records.len(),
        average: sum / records.len() as f64,
        min: totals.clone().fold(f64::INFINITY, f64::min),
        max: totals.fold(f64::NEG_INFINITY, f64::max),
    })
}

/// Read-only view of calculation history.
pub struct HistoryRollup<'a, S: CalculationStore + ?Sized> {
    store: &'a S,
    limit: u32,
}

impl<'a, S: CalculationStore + ?Sized> HistoryRollup<'a, S> {
    /// Create a rollup over the [`HISTORY_LIMIT`] most recent calculations.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            limit: HISTORY_LIMIT,
        }
    }

    /// Override the window size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// The most recent calculations, newest first, with their snapshots.
    pub fn recent(&self) -> Result<Vec<CalculationRecord>> {
        let records = self.store.list_calculations(Some(self.limit), true)?;
        debug!(count = records.len(), limit = self.limit, "Loaded recent history");
        Ok(records)
    }

    /// Every calculation, newest first.
    pub fn all(&self) -> Result<Vec<CalculationRecord>> {
        self.store.list_calculations(None, true)
    }

    /// Trend points for the recent window.
    pub fn series(&self, order: SeriesOrder) -> Result<Vec<TrendPoint>> {
        Ok(trend_series(&self.recent()?, order))
    }

    /// Summary of the recent window.
    pub fn stats(&self) -> Result<Option<HistoryStats>> {
        Ok(summarize(&self.recent()?))
    }
}
