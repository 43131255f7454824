//! KPI statistics
//!
//! Scalar figures for the overview cards and exported reports. Shares the
//! cost coercion in [`crate::cost`] with the chart aggregation.

pub mod timeline;

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use tracing::error;

use crate::cost::parse_cost;
use crate::models::Record;

pub use timeline::{data_quality, time_trends, DataQuality, TimeTrends};

/// Lowercased fragments marking a finished service ("Concluido", "Concluído", "Completed")
const COMPLETED_PATTERNS: [&str; 2] = ["conclu", "complet"];

/// Lowercased fragments marking a cancelled service ("Cancelado", "Cancelled")
const CANCELLED_PATTERNS: [&str; 1] = ["cancel"];

const TOP_OPERATORS: usize = 10;

/// Prefix that negates a completed fragment ("Incompleto", "Inconcluso")
const NEGATION_PREFIX: &str = "in";

/// Source statuses are inconsistent in casing and accents, so these are
/// substring matches rather than exact comparisons
pub fn is_completed(status: &str) -> bool {
    let lower = status.to_lowercase();
    COMPLETED_PATTERNS.iter().any(|p| {
        lower
            .match_indices(p)
            .any(|(i, _)| !lower[..i].ends_with(NEGATION_PREFIX))
    })
}

pub fn is_cancelled(status: &str) -> bool {
    let lower = status.to_lowercase();
    CANCELLED_PATTERNS.iter().any(|p| lower.contains(p))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_services: usize,
    pub completed_services: usize,
    pub cancelled_services: usize,
    /// Rounded to whole currency units
    pub total_cost: i64,
    /// `total_cost / total_services`, 0 when there are no services
    pub average_cost: i64,
    /// Smallest strictly positive cost
    pub min_cost: i64,
    pub max_cost: i64,
    /// Records with a strictly positive cost
    pub valid_cost_entries: usize,
    /// Percent, two decimals
    pub completion_rate: f64,
    pub cancellation_rate: f64,
    /// Distinct operator names as written, ignoring blank ones
    pub active_operators: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSummary {
    pub operator: String,
    pub services: u64,
    pub total_cost: i64,
    pub average_cost: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub status: String,
    pub count: u64,
    pub total_cost: i64,
    /// Share of all records, two decimals
    pub percent: f64,
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 10_000.0).round() / 100.0
}

fn round_cost(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        0
    }
}

/// Compute KPI statistics; an empty slice yields all zeros
pub fn compute_stats(records: &[Record]) -> Stats {
    match panic::catch_unwind(AssertUnwindSafe(|| build_stats(records))) {
        Ok(stats) => stats,
        Err(_) => {
            error!(
                "Statistics failed for {} records, returning zeroed stats",
                records.len()
            );
            Stats::default()
        }
    }
}

fn build_stats(records: &[Record]) -> Stats {
    let total_services = records.len();
    let mut completed_services = 0;
    let mut cancelled_services = 0;
    let mut cost_sum = 0.0;
    let mut min_cost: Option<f64> = None;
    let mut max_cost: Option<f64> = None;
    let mut valid_cost_entries = 0;
    let mut operators: HashSet<&str> = HashSet::new();

    for record in records {
        if let Some(status) = record.status.as_deref() {
            if is_completed(status) {
                completed_services += 1;
            }
            if is_cancelled(status) {
                cancelled_services += 1;
            }
        }

        let cost = parse_cost(record.total_cost.as_ref());
        if cost.is_finite() {
            cost_sum += cost;
            if cost > 0.0 {
                valid_cost_entries += 1;
                min_cost = Some(min_cost.map_or(cost, |m| m.min(cost)));
                max_cost = Some(max_cost.map_or(cost, |m| m.max(cost)));
            }
        }

        if let Some(operator) = record.operator.as_deref() {
            if !operator.trim().is_empty() {
                operators.insert(operator);
            }
        }
    }

    let average_cost = if total_services > 0 {
        round_cost(cost_sum / total_services as f64)
    } else {
        0
    };

    Stats {
        total_services,
        completed_services,
        cancelled_services,
        total_cost: round_cost(cost_sum),
        average_cost,
        min_cost: min_cost.map_or(0, round_cost),
        max_cost: max_cost.map_or(0, round_cost),
        valid_cost_entries,
        completion_rate: percent(completed_services, total_services),
        cancellation_rate: percent(cancelled_services, total_services),
        active_operators: operators.len(),
    }
}

/// Per-key service count and cost sum, in first-encounter order
fn tally<'a, F>(records: &'a [Record], key: F) -> Vec<(&'a str, u64, f64)>
where
    F: Fn(&'a Record) -> Option<&'a str>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<(&str, u64, f64)> = Vec::new();

    for record in records {
        let Some(k) = key(record) else {
            continue;
        };
        let cost = parse_cost(record.total_cost.as_ref());
        let i = *index.entry(k).or_insert_with(|| {
            rows.push((k, 0, 0.0));
            rows.len() - 1
        });
        rows[i].1 += 1;
        rows[i].2 += cost;
    }

    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows
}

/// Busiest operators with their cost totals
pub fn operator_breakdown(records: &[Record]) -> Vec<OperatorSummary> {
    tally(records, |r| {
        r.operator.as_deref().filter(|op| !op.trim().is_empty())
    })
    .into_iter()
    .take(TOP_OPERATORS)
    .map(|(operator, services, cost)| OperatorSummary {
        operator: operator.to_string(),
        services,
        total_cost: round_cost(cost),
        average_cost: round_cost(cost / services as f64),
    })
    .collect()
}

pub fn status_breakdown(records: &[Record]) -> Vec<StatusSummary> {
    tally(records, |r| r.status.as_deref().filter(|s| !s.is_empty()))
        .into_iter()
        .map(|(status, count, cost)| StatusSummary {
            status: status.to_string(),
            count,
            total_cost: round_cost(cost),
            percent: percent(count as usize, records.len()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Vec<Record> {
        vec![
            Record::new()
                .with_status("Concluido")
                .with_operator("A")
                .with_cost("$100"),
            Record::new()
                .with_status("Cancelado")
                .with_operator("A")
                .with_cost(100.0),
            Record::new().with_status("Pendiente").with_operator("B"),
        ]
    }

    #[test]
    fn test_end_to_end_scenario() {
        let stats = compute_stats(&scenario());
        assert_eq!(stats.total_services, 3);
        assert_eq!(stats.completed_services, 1);
        assert_eq!(stats.cancelled_services, 1);
        assert_eq!(stats.total_cost, 200);
        assert_eq!(stats.average_cost, 67);
        assert_eq!(stats.active_operators, 2);
        assert_eq!(stats.completion_rate, 33.33);
        assert_eq!(stats.min_cost, 100);
        assert_eq!(stats.max_cost, 100);
        assert_eq!(stats.valid_cost_entries, 2);
    }

    #[test]
    fn test_empty_is_zeroed() {
        assert_eq!(compute_stats(&[]), Stats::default());
    }

    #[test]
    fn test_status_patterns() {
        assert!(is_completed("CONCLUÍDO"));
        assert!(is_completed("Service completed"));
        assert!(!is_completed("Pendiente"));
        assert!(is_cancelled("cancelled by client"));
        assert!(!is_cancelled("Concluido"));
    }

    #[test]
    fn test_negated_statuses_not_completed() {
        assert!(!is_completed("Incompleto"));
        assert!(!is_completed("INCOMPLETE"));
        assert!(!is_completed("Inconcluso"));
        assert!(is_completed("Incomplete form, completed later"));

        let records = vec![
            Record::new().with_status("Incompleto"),
            Record::new().with_status("Incomplete"),
        ];
        let stats = compute_stats(&records);
        assert_eq!(stats.completed_services, 0);
        assert_eq!(stats.completion_rate, 0.0);
    }

    #[test]
    fn test_blank_operators_not_active() {
        let records = vec![
            Record::new().with_operator("  "),
            Record::new().with_operator("A "),
            Record::new().with_operator("A"),
        ];
        // Names are kept verbatim, matching the operator chart and breakdown
        assert_eq!(compute_stats(&records).active_operators, 2);
        assert_eq!(operator_breakdown(&records).len(), 2);
    }

    #[test]
    fn test_operator_breakdown() {
        let breakdown = operator_breakdown(&scenario());
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].operator, "A");
        assert_eq!(breakdown[0].services, 2);
        assert_eq!(breakdown[0].total_cost, 200);
        assert_eq!(breakdown[0].average_cost, 100);
        assert_eq!(breakdown[1].total_cost, 0);
    }

    #[test]
    fn test_status_breakdown() {
        let mut records = scenario();
        records.push(Record::new().with_status("Concluido").with_cost("50"));
        let breakdown = status_breakdown(&records);
        assert_eq!(breakdown[0].status, "Concluido");
        assert_eq!(breakdown[0].count, 2);
        assert_eq!(breakdown[0].total_cost, 150);
        assert_eq!(breakdown[0].percent, 50.0);
        assert_eq!(breakdown.len(), 3);
    }
}
