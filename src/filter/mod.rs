//! Filter engine
//!
//! Applies a [`FilterSpec`] to a slice of records. Filtering is pure and
//! order-preserving; an unparseable date bound or a malformed record never
//! aborts the pass.

pub mod validation;

pub use validation::{
    filter_impact, validate_filters, validate_filters_json, FilterError, FilterImpact,
    FilterValidation,
};

use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::debug;

use crate::models::{FilterSpec, Record};

/// Bounds and sets resolved once per filtering pass
struct ResolvedFilter<'a> {
    spec: &'a FilterSpec,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl<'a> ResolvedFilter<'a> {
    fn new(spec: &'a FilterSpec) -> Self {
        let from = spec.from_date();
        let to = spec.to_date();

        if spec.date_from.is_some() && from.is_none() {
            debug!("Ignoring unparseable dateFrom {:?}", spec.date_from);
        }
        if spec.date_to.is_some() && to.is_none() {
            debug!("Ignoring unparseable dateTo {:?}", spec.date_to);
        }

        Self { spec, from, to }
    }

    fn matches(&self, record: &Record) -> bool {
        accepts(&self.spec.operator, record.operator.as_deref())
            && accepts(&self.spec.status, record.status.as_deref())
            && accepts(&self.spec.client, record.client.as_deref())
            && accepts(&self.spec.unit, record.operational_unit.as_deref())
            && self.matches_dates(record)
    }

    fn matches_dates(&self, record: &Record) -> bool {
        if self.from.is_none() && self.to.is_none() {
            return true;
        }

        // Calendar date only: time-of-day never affects inclusion
        let Some(date) = record.registered_date() else {
            return false;
        };

        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Empty set means "no constraint"; otherwise the value must be present and listed
fn accepts(allowed: &BTreeSet<String>, value: Option<&str>) -> bool {
    if allowed.is_empty() {
        return true;
    }
    value.is_some_and(|v| allowed.contains(v))
}

/// Whether a single record passes the filter
pub fn matches(record: &Record, filters: &FilterSpec) -> bool {
    ResolvedFilter::new(filters).matches(record)
}

/// Records that pass `filters`, in input order
pub fn apply_filters(records: &[Record], filters: &FilterSpec) -> Vec<Record> {
    let resolved = ResolvedFilter::new(filters);
    let filtered: Vec<Record> = records
        .iter()
        .filter(|record| resolved.matches(record))
        .cloned()
        .collect();

    debug!(
        "Filtered {} records down to {}",
        records.len(),
        filtered.len()
    );
    filtered
}
