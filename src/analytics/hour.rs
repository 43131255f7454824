//! Hour-of-day extraction from time-of-contact values

use chrono::{DateTime, Timelike};
use regex::Regex;
use std::sync::OnceLock;

use crate::cost::leading_float;
use crate::models::{parse_timestamp, ContactTime};

/// Numbers above this are epoch milliseconds rather than hours
const EPOCH_MILLIS_THRESHOLD: f64 = 1_000_000_000.0;

/// `D/M/YYYY H:MM[:SS]` with `/` or `-` date separators and `:` or `.` time separators
fn date_time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d{1,2})[/\-](\d{1,2})[/\-](\d{2,4})\s+(\d{1,2})[:.](\d{1,2})(?:[:.](\d{1,2}))?")
            .expect("date-time pattern is valid")
    })
}

/// Bare `H:MM[:SS]`
fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2})[:.](\d{1,2})(?:[:.](\d{1,2}))?$").expect("time pattern is valid")
    })
}

/// Hour (0..=23) a contact happened in, if it can be determined
pub fn contact_hour(tc: &ContactTime) -> Option<u32> {
    let hour = match tc {
        ContactTime::Timestamp(at) => Some(at.hour()),
        ContactTime::Number(n) => hour_from_number(*n),
        ContactTime::Text(text) => hour_from_text(text),
    };
    hour.filter(|h| *h < 24)
}

fn hour_from_number(n: f64) -> Option<u32> {
    if !n.is_finite() || n < 0.0 {
        return None;
    }
    if n > EPOCH_MILLIS_THRESHOLD {
        return DateTime::from_timestamp_millis(n as i64).map(|at| at.hour());
    }
    Some(n.floor() as u32)
}

fn hour_from_text(text: &str) -> Option<u32> {
    let text = text.trim();

    if let Some(caps) = date_time_pattern().captures(text) {
        return caps[4].parse().ok();
    }
    if let Some(caps) = time_pattern().captures(text) {
        return caps[1].parse().ok();
    }
    if let Some(at) = parse_timestamp(text) {
        return Some(at.hour());
    }
    leading_float(text).and_then(hour_from_number)
}
