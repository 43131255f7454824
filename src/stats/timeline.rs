//! Registration-date coverage and field completeness of a record set

use chrono::{Datelike, NaiveDateTime, Weekday};
use serde::Serialize;

use crate::cost::parse_cost;
use crate::models::Record;

/// Weekday rows in calendar order, Sunday first
const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSpan {
    pub min: NaiveDateTime,
    pub max: NaiveDateTime,
    /// Elapsed days between `min` and `max`, partial days rounded up
    pub days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdayCount {
    pub day: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTrends {
    pub total_with_dates: usize,
    /// `None` when no record has a readable registration timestamp
    pub date_range: Option<DateSpan>,
    /// Always seven rows, Sunday through Saturday
    pub by_weekday: Vec<WeekdayCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    pub total_records: usize,
    /// Strictly positive parsed cost
    pub records_with_cost: usize,
    pub records_with_operator: usize,
    pub records_with_status: usize,
    pub records_with_date: usize,
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

fn elapsed_days(min: NaiveDateTime, max: NaiveDateTime) -> i64 {
    let seconds = (max - min).num_seconds();
    seconds / SECONDS_PER_DAY + i64::from(seconds % SECONDS_PER_DAY > 0)
}

/// Date range and weekday distribution of registration timestamps
pub fn time_trends(records: &[Record]) -> TimeTrends {
    let mut counts = [0u64; 7];
    let mut range: Option<(NaiveDateTime, NaiveDateTime)> = None;
    let mut total_with_dates = 0;

    for at in records.iter().filter_map(|r| r.registered_at) {
        total_with_dates += 1;
        counts[at.weekday().num_days_from_sunday() as usize] += 1;
        range = Some(match range {
            Some((min, max)) => (min.min(at), max.max(at)),
            None => (at, at),
        });
    }

    TimeTrends {
        total_with_dates,
        date_range: range.map(|(min, max)| DateSpan {
            min,
            max,
            days: elapsed_days(min, max),
        }),
        by_weekday: WEEK
            .iter()
            .zip(counts)
            .map(|(day, count)| WeekdayCount {
                day: weekday_name(*day).to_string(),
                count,
            })
            .collect(),
    }
}

fn present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// How many records carry each field the dashboard depends on
pub fn data_quality(records: &[Record]) -> DataQuality {
    records.iter().fold(
        DataQuality {
            total_records: records.len(),
            ..DataQuality::default()
        },
        |mut quality, record| {
            if parse_cost(record.total_cost.as_ref()) > 0.0 {
                quality.records_with_cost += 1;
            }
            if present(record.operator.as_deref()) {
                quality.records_with_operator += 1;
            }
            if present(record.status.as_deref()) {
                quality.records_with_status += 1;
            }
            if record.registered_at.is_some() {
                quality.records_with_date += 1;
            }
            quality
        },
    )
}
