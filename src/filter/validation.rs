//! Filter validation and impact reporting
//!
//! Validation is advisory: it tells the UI what is wrong with a selection,
//! but `apply_filters` treats anything invalid as "no constraint" either way.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{parse_filter_date, FilterSpec};

/// Ranges wider than this produce a warning
const WIDE_RANGE_DAYS: i64 = 730;

const DIMENSION_KEYS: [&str; 4] = ["operator", "status", "client", "unit"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("{field} must use the YYYY-MM-DD format")]
    DateFormat { field: &'static str },
    #[error("{field} is not a valid calendar date")]
    InvalidDate { field: &'static str },
    #[error("dateFrom must not be after dateTo")]
    InvertedRange,
    #[error("{field} must be an array")]
    NotAnArray { field: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl FilterValidation {
    fn ok() -> Self {
        Self {
            valid: true,
            ..Default::default()
        }
    }

    fn push_error(&mut self, error: FilterError) {
        self.valid = false;
        self.errors.push(error.to_string());
    }
}

/// How much a filter pass removed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterImpact {
    pub original: usize,
    pub filtered: usize,
    pub removed: usize,
    pub reduction_percent: f64,
}

fn check_date(field: &'static str, raw: &str) -> Result<NaiveDate, FilterError> {
    let raw = raw.trim();
    let shaped = raw.len() == 10
        && raw.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });
    if !shaped {
        return Err(FilterError::DateFormat { field });
    }
    parse_filter_date(raw).ok_or(FilterError::InvalidDate { field })
}

/// Validate the date bounds of a typed filter spec
pub fn validate_filters(filters: &FilterSpec) -> FilterValidation {
    let mut result = FilterValidation::ok();

    let from = filters
        .date_from
        .as_deref()
        .map(|raw| check_date("dateFrom", raw))
        .transpose();
    let to = filters
        .date_to
        .as_deref()
        .map(|raw| check_date("dateTo", raw))
        .transpose();

    let from = from.unwrap_or_else(|e| {
        result.push_error(e);
        None
    });
    let to = to.unwrap_or_else(|e| {
        result.push_error(e);
        None
    });

    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            result.push_error(FilterError::InvertedRange);
        }

        let days = (to - from).num_days().abs();
        if days > WIDE_RANGE_DAYS {
            result
                .warnings
                .push(format!("Date range is very wide: {} days", days));
        }
    }

    result
}

/// Validate a raw JSON filter object, including shape problems that
/// lenient deserialization would otherwise swallow
pub fn validate_filters_json(raw: &Value) -> FilterValidation {
    let Some(object) = raw.as_object() else {
        let mut result = FilterValidation::ok();
        result.valid = false;
        result.errors.push("filters must be an object".to_string());
        return result;
    };

    let mut shape_errors = Vec::new();
    for key in DIMENSION_KEYS {
        if let Some(value) = object.get(key) {
            if !value.is_array() && !value.is_null() {
                shape_errors.push(FilterError::NotAnArray {
                    field: key.to_string(),
                });
            }
        }
    }

    let spec: FilterSpec = serde_json::from_value(raw.clone()).unwrap_or_default();
    let mut result = validate_filters(&spec);
    for error in shape_errors {
        result.push_error(error);
    }
    result
}

pub fn filter_impact(original: usize, filtered: usize) -> FilterImpact {
    let removed = original.saturating_sub(filtered);
    let reduction_percent = if original > 0 {
        (removed as f64 / original as f64 * 10_000.0).round() / 100.0
    } else {
        0.0
    };

    FilterImpact {
        original,
        filtered,
        removed,
        reduction_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_range() {
        let spec = FilterSpec::new()
            .with_date_from("2024-01-01")
            .with_date_to("2024-02-01");
        let result = validate_filters(&spec);
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_bad_format_and_calendar_date() {
        let spec = FilterSpec::new()
            .with_date_from("01/01/2024")
            .with_date_to("2024-02-30");
        let result = validate_filters(&spec);
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![
                "dateFrom must use the YYYY-MM-DD format".to_string(),
                "dateTo is not a valid calendar date".to_string(),
            ]
        );
    }

    #[test]
    fn test_padded_dates_validate_like_they_filter() {
        let spec = FilterSpec::new()
            .with_date_from(" 2024-01-01")
            .with_date_to("2024-01-31 ");
        let result = validate_filters(&spec);
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(spec.date_range().is_some());
    }

    #[test]
    fn test_inverted_and_wide_ranges() {
        let spec = FilterSpec::new()
            .with_date_from("2024-03-01")
            .with_date_to("2024-01-01");
        let result = validate_filters(&spec);
        assert!(!result.valid);
        assert!(result.errors.contains(&FilterError::InvertedRange.to_string()));

        let spec = FilterSpec::new()
            .with_date_from("2020-01-01")
            .with_date_to("2024-01-01");
        let result = validate_filters(&spec);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_json_shape_errors() {
        let result = validate_filters_json(&json!({ "operator": "A", "status": [] }));
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["operator must be an array".to_string()]);

        assert!(!validate_filters_json(&json!([1, 2])).valid);
        assert!(validate_filters_json(&json!({})).valid);
    }

    #[test]
    fn test_filter_impact() {
        let impact = filter_impact(3, 1);
        assert_eq!(impact.removed, 2);
        assert_eq!(impact.reduction_percent, 66.67);

        let impact = filter_impact(0, 0);
        assert_eq!(impact.reduction_percent, 0.0);
    }
}
