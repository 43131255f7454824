//! Temporal bucketing policy and missing-period backfill

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::analytics::models::{PeriodEntry, PeriodGranularity};
use crate::analytics::AggregateError;
use crate::models::FilterSpec;

/// Ranges up to this many days (inclusive) are charted per day
pub const DAY_GRANULARITY_MAX_DAYS: i64 = 31;

/// Inclusive number of calendar days covered by the filter's date range
pub fn range_days(filters: &FilterSpec) -> Option<i64> {
    let (from, to) = filters.date_range()?;
    Some((to - from).num_days().abs() + 1)
}

/// Day buckets for short explicit ranges, month buckets otherwise
pub fn granularity_for(filters: &FilterSpec) -> PeriodGranularity {
    match range_days(filters) {
        Some(days) if days <= DAY_GRANULARITY_MAX_DAYS => PeriodGranularity::Day,
        _ => PeriodGranularity::Month,
    }
}

pub fn period_key(date: NaiveDate, granularity: PeriodGranularity) -> String {
    match granularity {
        PeriodGranularity::Day => date.format("%Y-%m-%d").to_string(),
        PeriodGranularity::Month => date.format("%Y-%m").to_string(),
    }
}

/// Accumulated count and cost per period key
#[derive(Debug, Default)]
pub(crate) struct PeriodCounter {
    periods: BTreeMap<String, (u64, f64)>,
}

impl PeriodCounter {
    pub(crate) fn add(&mut self, key: String, cost: f64) {
        let entry = self.periods.entry(key).or_insert((0, 0.0));
        entry.0 += 1;
        if cost.is_finite() {
            entry.1 += cost;
        }
    }

    /// Periods that received records, ascending
    pub(crate) fn into_sorted(self) -> Vec<PeriodEntry> {
        self.periods
            .into_iter()
            .map(|(key, (count, cost_total))| PeriodEntry {
                key,
                count,
                cost_total,
            })
            .collect()
    }

    /// One entry per day in `from..=to`, zero-filled where nothing was counted
    pub(crate) fn backfill_days(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PeriodEntry>, AggregateError> {
        let mut result = Vec::new();
        let mut day = from;

        while day <= to {
            let key = period_key(day, PeriodGranularity::Day);
            let entry = match self.periods.get(&key) {
                Some(&(count, cost_total)) => PeriodEntry {
                    key,
                    count,
                    cost_total,
                },
                None => PeriodEntry::empty(key),
            };
            result.push(entry);

            if day == to {
                break;
            }
            day = day.succ_opt().ok_or(AggregateError::DateOverflow(day))?;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_granularity_threshold() {
        let spec = FilterSpec::new()
            .with_date_from("2024-01-01")
            .with_date_to("2024-01-31");
        assert_eq!(range_days(&spec), Some(31));
        assert_eq!(granularity_for(&spec), PeriodGranularity::Day);

        let spec = FilterSpec::new()
            .with_date_from("2024-01-01")
            .with_date_to("2024-02-01");
        assert_eq!(range_days(&spec), Some(32));
        assert_eq!(granularity_for(&spec), PeriodGranularity::Month);
    }

    #[test]
    fn test_single_bound_is_monthly() {
        let spec = FilterSpec::new().with_date_from("2024-01-01");
        assert_eq!(range_days(&spec), None);
        assert_eq!(granularity_for(&spec), PeriodGranularity::Month);
        assert_eq!(granularity_for(&FilterSpec::default()), PeriodGranularity::Month);
    }

    #[test]
    fn test_period_keys() {
        let d = date("2024-03-07");
        assert_eq!(period_key(d, PeriodGranularity::Day), "2024-03-07");
        assert_eq!(period_key(d, PeriodGranularity::Month), "2024-03");
    }

    #[test]
    fn test_backfill_fills_gaps() {
        let mut counter = PeriodCounter::default();
        counter.add("2024-01-01".into(), 10.0);
        counter.add("2024-01-03".into(), f64::NAN);

        let days = counter
            .backfill_days(date("2023-12-31"), date("2024-01-03"))
            .unwrap();
        let keys: Vec<&str> = days.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, ["2023-12-31", "2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(days[0].count, 0);
        assert_eq!(days[1].cost_total, 10.0);
        assert_eq!(days[3].count, 1);
        assert_eq!(days[3].cost_total, 0.0);
    }

    #[test]
    fn test_backfill_at_calendar_end() {
        let counter = PeriodCounter::default();
        let days = counter.backfill_days(NaiveDate::MAX, NaiveDate::MAX).unwrap();
        assert_eq!(days.len(), 1);
    }
}
