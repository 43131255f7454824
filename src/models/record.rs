use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::cost::CostValue;

/// One normalized service event
///
/// Produced by the ingestion layer. Every field is optional because the
/// source spreadsheets are; malformed values deserialize to `None` instead
/// of failing the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Opaque service identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<Value>,

    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub registered_at: Option<NaiveDateTime>,

    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub assigned_at: Option<NaiveDateTime>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub operator: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub operational_unit: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub account: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub client: Option<String>,

    /// Raw cost, only ever read through [`crate::cost::parse_cost`]
    #[serde(default)]
    pub total_cost: Option<CostValue>,

    /// Time of contact, used for the hour-of-day distribution only
    #[serde(default, deserialize_with = "lenient_contact_time")]
    pub tc: Option<ContactTime>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registered_at(mut self, at: NaiveDateTime) -> Self {
        self.registered_at = Some(at);
        self
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.operational_unit = Some(unit.into());
        self
    }

    pub fn with_cost(mut self, cost: impl Into<CostValue>) -> Self {
        self.total_cost = Some(cost.into());
        self
    }

    pub fn with_contact_time(mut self, tc: ContactTime) -> Self {
        self.tc = Some(tc);
        self
    }

    /// Calendar date of registration, time-of-day discarded
    pub fn registered_date(&self) -> Option<NaiveDate> {
        self.registered_at.map(|at| at.date())
    }
}

/// Time-of-contact value in whichever shape the spreadsheet carried it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContactTime {
    Number(f64),
    Timestamp(NaiveDateTime),
    Text(String),
}

/// Parse the timestamp shapes ingestion emits
///
/// An explicit offset is dropped and the wall-clock time kept, so calendar
/// comparisons never shift across a timezone boundary.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => {
            let parsed = parse_timestamp(&s);
            if parsed.is_none() {
                tracing::debug!("Discarding unparseable timestamp '{}'", s);
            }
            parsed
        }
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_contact_time<'de, D>(deserializer: D) -> Result<Option<ContactTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().map(ContactTime::Number),
        Some(Value::String(s)) => Some(match parse_timestamp(&s) {
            Some(at) => ContactTime::Timestamp(at),
            None => ContactTime::Text(s),
        }),
        _ => None,
    })
}
