//! Offloading aggregation off the caller's task
//!
//! Aggregation is pure CPU work over shared, immutable input, so it can run
//! on tokio's blocking pool without any coordination. A stale result is
//! simply dropped by the caller; nothing is cancelled mid-computation.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::analytics::{aggregate, ChartDataBundle};
use crate::models::{FilterSpec, Record};
use crate::stats::{compute_stats, Stats};

pub fn aggregate_in_background(
    records: Arc<[Record]>,
    filters: FilterSpec,
) -> JoinHandle<ChartDataBundle> {
    tokio::task::spawn_blocking(move || aggregate(&records, &filters))
}

pub fn stats_in_background(records: Arc<[Record]>) -> JoinHandle<Stats> {
    tokio::task::spawn_blocking(move || compute_stats(&records))
}
