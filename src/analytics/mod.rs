//! Chart aggregation module
//!
//! Builds the grouped summary tables that drive the dashboard charts, plus
//! the trend and peak-hour views derived from them.

pub mod aggregator;
pub mod hour;
pub mod insights;
pub mod models;
pub mod period;

use chrono::NaiveDate;
use thiserror::Error;

pub use aggregator::{aggregate, TOP_N};
pub use hour::contact_hour;
pub use insights::{
    analyze_hourly_patterns, calculate_trends, HourlyPatterns, TrendAnalysis, TrendDirection,
};
pub use models::{ChartDataBundle, ChartEntry, PeriodEntry, PeriodGranularity, UNKNOWN_KEY};
pub use period::{granularity_for, range_days, DAY_GRANULARITY_MAX_DAYS};

/// Failure inside a single grouping step; recovered locally, never surfaced
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("date arithmetic overflowed after {0}")]
    DateOverflow(NaiveDate),
}
