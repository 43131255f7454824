//! Chart aggregation
//!
//! Turns a filtered slice of records into the grouped tables behind every
//! dashboard chart. All dimensions are counted in a single pass; a value
//! that cannot be bucketed is skipped for that dimension only.
//!
//! Aggregation never fails from the caller's point of view: the rendering
//! path that consumes it has nowhere to show an error, so an unexpected
//! panic inside grouping is contained and an empty bundle is returned.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, warn};

use crate::analytics::hour::contact_hour;
use crate::analytics::models::{
    hour_table, ChartDataBundle, ChartEntry, PeriodGranularity, UNKNOWN_KEY,
};
use crate::analytics::period::{granularity_for, period_key, PeriodCounter};
use crate::cost::parse_cost;
use crate::models::{FilterSpec, Record};

/// `by_operator` and `by_client` keep only this many rows
pub const TOP_N: usize = 10;

/// Insertion-ordered counter so equal counts keep first-encounter order
#[derive(Debug, Default)]
struct GroupCounter {
    index: HashMap<String, usize>,
    entries: Vec<ChartEntry>,
}

impl GroupCounter {
    fn increment(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push(ChartEntry::new(key, 1));
            }
        }
    }

    /// Descending by count; `sort_by` is stable so ties stay in encounter order
    fn into_sorted(self, limit: Option<usize>) -> Vec<ChartEntry> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        entries
    }
}

/// Grouping key for a nullable dimension value
fn group_key(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => UNKNOWN_KEY,
    }
}

/// Build the chart bundle for `records` under `filters`
///
/// `filters` only decides period granularity and backfill; the records are
/// expected to be filtered already.
pub fn aggregate(records: &[Record], filters: &FilterSpec) -> ChartDataBundle {
    match panic::catch_unwind(AssertUnwindSafe(|| build_bundle(records, filters))) {
        Ok(bundle) => bundle,
        Err(_) => {
            error!(
                "Chart aggregation failed for {} records, returning empty bundle",
                records.len()
            );
            ChartDataBundle::empty()
        }
    }
}

fn build_bundle(records: &[Record], filters: &FilterSpec) -> ChartDataBundle {
    let granularity = granularity_for(filters);

    let mut periods = PeriodCounter::default();
    let mut operators = GroupCounter::default();
    let mut statuses = GroupCounter::default();
    let mut units = GroupCounter::default();
    let mut clients = GroupCounter::default();
    let mut hours = [0u64; 24];
    let mut skipped_hours = 0usize;

    for record in records {
        if let Some(date) = record.registered_date() {
            periods.add(
                period_key(date, granularity),
                parse_cost(record.total_cost.as_ref()),
            );
        }

        if let Some(tc) = &record.tc {
            match contact_hour(tc) {
                Some(hour) => hours[hour as usize] += 1,
                None => skipped_hours += 1,
            }
        }

        operators.increment(group_key(record.operator.as_deref()));
        statuses.increment(group_key(record.status.as_deref()));
        units.increment(group_key(record.operational_unit.as_deref()));
        clients.increment(group_key(record.client.as_deref()));
    }

    if skipped_hours > 0 {
        debug!("Skipped {} unreadable contact times", skipped_hours);
    }

    let by_period = match (granularity, filters.date_range()) {
        (PeriodGranularity::Day, Some((from, to))) if from <= to => {
            periods.backfill_days(from, to).unwrap_or_else(|e| {
                warn!("Period backfill failed, keeping sparse periods: {}", e);
                periods.into_sorted()
            })
        }
        _ => periods.into_sorted(),
    };

    debug!(
        "Aggregated {} records into {} {:?} periods",
        records.len(),
        by_period.len(),
        granularity
    );

    ChartDataBundle {
        by_period,
        by_operator: operators.into_sorted(Some(TOP_N)),
        by_status: statuses.into_sorted(None),
        by_unit: units.into_sorted(None),
        by_client: clients.into_sorted(Some(TOP_N)),
        by_hour: hour_table(&hours),
        period_label: granularity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContactTime;
    use chrono::NaiveDateTime;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_group_counter_ties_keep_encounter_order() {
        let mut counter = GroupCounter::default();
        for key in ["b", "a", "c", "a", "c"] {
            counter.increment(key);
        }
        let sorted = counter.into_sorted(None);
        let keys: Vec<&str> = sorted.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["a", "c", "b"]);
    }

    #[test]
    fn test_missing_fields_bucket_as_unknown() {
        let records = vec![
            Record::new().with_operator("A"),
            Record::new(),
            Record::new().with_operator(""),
        ];
        let bundle = aggregate(&records, &FilterSpec::default());

        assert_eq!(bundle.by_operator[0], ChartEntry::new(UNKNOWN_KEY, 2));
        assert_eq!(bundle.by_operator[1], ChartEntry::new("A", 1));
        assert_eq!(bundle.by_status, vec![ChartEntry::new(UNKNOWN_KEY, 3)]);
        // No timestamps means no periods
        assert!(bundle.by_period.is_empty());
    }

    #[test]
    fn test_monthly_periods_with_costs() {
        let records = vec![
            Record::new()
                .with_registered_at(at("2024-02-10 08:00"))
                .with_cost("$1,000"),
            Record::new()
                .with_registered_at(at("2024-01-31 23:59"))
                .with_cost(250.0),
            Record::new()
                .with_registered_at(at("2024-02-01 00:00"))
                .with_cost("n/a"),
        ];
        let bundle = aggregate(&records, &FilterSpec::default());

        assert_eq!(bundle.period_label, PeriodGranularity::Month);
        assert_eq!(bundle.by_period.len(), 2);
        assert_eq!(bundle.by_period[0].key, "2024-01");
        assert_eq!(bundle.by_period[0].cost_total, 250.0);
        assert_eq!(bundle.by_period[1].key, "2024-02");
        assert_eq!(bundle.by_period[1].count, 2);
        assert_eq!(bundle.by_period[1].cost_total, 1000.0);
    }

    #[test]
    fn test_hours_come_from_contact_time() {
        let records = vec![
            Record::new()
                .with_registered_at(at("2024-01-01 03:00"))
                .with_contact_time(ContactTime::Text("14:10".into())),
            Record::new().with_contact_time(ContactTime::Number(14.0)),
            Record::new().with_contact_time(ContactTime::Text("garbage".into())),
        ];
        let bundle = aggregate(&records, &FilterSpec::default());

        assert_eq!(bundle.by_hour.len(), 24);
        assert_eq!(bundle.by_hour[14].count, 2);
        assert_eq!(bundle.by_hour[3].count, 0);
        // Unreadable contact time still counts in other tables
        assert_eq!(bundle.by_status[0].count, 3);
    }

    #[test]
    fn test_top_n_truncation() {
        let records: Vec<Record> = (0..15)
            .map(|i| {
                Record::new()
                    .with_operator(format!("op{}", i))
                    .with_client(format!("client{}", i))
                    .with_unit(format!("unit{}", i))
            })
            .collect();
        let bundle = aggregate(&records, &FilterSpec::default());

        assert_eq!(bundle.by_operator.len(), TOP_N);
        assert_eq!(bundle.by_client.len(), TOP_N);
        assert_eq!(bundle.by_unit.len(), 15);
        assert_eq!(bundle.by_operator[0].key, "op0");
    }

    #[test]
    fn test_inverted_range_skips_backfill() {
        let records = vec![Record::new().with_registered_at(at("2024-01-02 10:00"))];
        let spec = FilterSpec::new()
            .with_date_from("2024-01-05")
            .with_date_to("2024-01-01");
        let bundle = aggregate(&records, &spec);

        assert_eq!(bundle.period_label, PeriodGranularity::Day);
        assert_eq!(bundle.by_period.len(), 1);
        assert_eq!(bundle.by_period[0].key, "2024-01-02");
    }
}
