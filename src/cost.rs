//! Cost coercion shared by every consumer of `total_cost`

use serde::{Deserialize, Serialize};

/// Raw cost value as delivered by ingestion
///
/// Spreadsheets hand us plain numbers, currency-formatted strings
/// ("$1,234.50") or something else entirely. Everything that reads a
/// cost goes through [`parse_cost`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CostValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl From<f64> for CostValue {
    fn from(value: f64) -> Self {
        CostValue::Number(value)
    }
}

impl From<&str> for CostValue {
    fn from(value: &str) -> Self {
        CostValue::Text(value.to_string())
    }
}

/// Coerce a raw cost into a finite number, defaulting to 0
pub fn parse_cost(value: Option<&CostValue>) -> f64 {
    match value {
        Some(CostValue::Number(n)) if n.is_finite() => *n,
        Some(CostValue::Text(s)) => parse_cost_str(s),
        _ => 0.0,
    }
}

/// Strip everything except digits, `.` and `-`, then read the leading number
pub fn parse_cost_str(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    leading_float(&cleaned)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Longest `-?digits[.digits]` prefix, like a lenient float reader
///
/// "12.5.3" reads as 12.5 and "7-2" as 7; a prefix without digits is `None`.
pub(crate) fn leading_float(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut digits = 0;
    let mut seen_dot = false;

    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => digits += 1,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    if digits == 0 {
        return None;
    }

    s[..end].trim_end_matches('.').parse::<f64>().ok()
}
