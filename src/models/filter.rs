use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Calendar date format accepted for `dateFrom` / `dateTo`
pub const FILTER_DATE_FORMAT: &str = "%Y-%m-%d";

/// Active filter selection
///
/// An empty set places no constraint on its dimension. Keys that are
/// missing or have the wrong JSON type deserialize as "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    #[serde(default, deserialize_with = "lenient_set")]
    pub operator: BTreeSet<String>,

    #[serde(default, deserialize_with = "lenient_set")]
    pub status: BTreeSet<String>,

    #[serde(default, deserialize_with = "lenient_set")]
    pub client: BTreeSet<String>,

    #[serde(default, deserialize_with = "lenient_set")]
    pub unit: BTreeSet<String>,

    /// Inclusive lower bound, `YYYY-MM-DD`
    #[serde(default, deserialize_with = "lenient_date_string")]
    pub date_from: Option<String>,

    /// Inclusive upper bound, `YYYY-MM-DD`
    #[serde(default, deserialize_with = "lenient_date_string")]
    pub date_to: Option<String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operators<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operator.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_statuses<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.status.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_clients<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.client.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_units<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unit.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_date_from(mut self, date: impl Into<String>) -> Self {
        self.date_from = Some(date.into());
        self
    }

    pub fn with_date_to(mut self, date: impl Into<String>) -> Self {
        self.date_to = Some(date.into());
        self
    }

    /// True when no dimension or date constraint is set
    pub fn is_empty(&self) -> bool {
        self.operator.is_empty()
            && self.status.is_empty()
            && self.client.is_empty()
            && self.unit.is_empty()
            && self.from_date().is_none()
            && self.to_date().is_none()
    }

    /// Parsed lower bound; an unparseable value counts as absent
    pub fn from_date(&self) -> Option<NaiveDate> {
        self.date_from.as_deref().and_then(parse_filter_date)
    }

    /// Parsed upper bound; an unparseable value counts as absent
    pub fn to_date(&self) -> Option<NaiveDate> {
        self.date_to.as_deref().and_then(parse_filter_date)
    }

    /// Both bounds, when both parse
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.from_date()?, self.to_date()?))
    }
}

pub fn parse_filter_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), FILTER_DATE_FORMAT).ok()
}

fn lenient_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => BTreeSet::new(),
    })
}

fn lenient_date_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}
