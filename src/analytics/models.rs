//! Data models for chart aggregation

use serde::{Deserialize, Serialize};

/// Key used for records whose grouping field is missing
pub const UNKNOWN_KEY: &str = "Unknown";

/// One bar of a grouped table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub key: String,
    pub count: u64,
}

impl ChartEntry {
    pub fn new(key: impl Into<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/// One period of the time series, with the cost accumulated in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodEntry {
    /// `YYYY-MM-DD` for days, `YYYY-MM` for months
    pub key: String,
    pub count: u64,
    pub cost_total: f64,
}

impl PeriodEntry {
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            count: 0,
            cost_total: 0.0,
        }
    }
}

/// Temporal bucket size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodGranularity {
    Day,
    Month,
}

impl PeriodGranularity {
    /// Chart title for the time series
    pub fn title(self) -> &'static str {
        match self {
            PeriodGranularity::Day => "Services per Day",
            PeriodGranularity::Month => "Services per Month",
        }
    }
}

/// Every grouped table produced by one aggregation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataBundle {
    pub by_period: Vec<PeriodEntry>,
    /// Top 10 by count
    pub by_operator: Vec<ChartEntry>,
    pub by_status: Vec<ChartEntry>,
    pub by_unit: Vec<ChartEntry>,
    /// Top 10 by count
    pub by_client: Vec<ChartEntry>,
    /// Always 24 entries, `00:00` through `23:00`
    pub by_hour: Vec<ChartEntry>,
    pub period_label: PeriodGranularity,
}

impl ChartDataBundle {
    /// Well-formed bundle with no data, returned when aggregation fails
    pub fn empty() -> Self {
        Self {
            by_period: Vec::new(),
            by_operator: Vec::new(),
            by_status: Vec::new(),
            by_unit: Vec::new(),
            by_client: Vec::new(),
            by_hour: hour_table(&[0; 24]),
            period_label: PeriodGranularity::Month,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_period.iter().all(|p| p.count == 0)
            && self.by_operator.is_empty()
            && self.by_status.is_empty()
            && self.by_unit.is_empty()
            && self.by_client.is_empty()
            && self.by_hour.iter().all(|h| h.count == 0)
    }
}

impl Default for ChartDataBundle {
    fn default() -> Self {
        Self::empty()
    }
}

pub fn hour_label(hour: usize) -> String {
    format!("{:02}:00", hour)
}

/// Expand per-hour counters into the fixed 24-row table
pub(crate) fn hour_table(counts: &[u64; 24]) -> Vec<ChartEntry> {
    counts
        .iter()
        .enumerate()
        .map(|(hour, &count)| ChartEntry::new(hour_label(hour), count))
        .collect()
}
