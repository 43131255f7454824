use base64::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::models::{FilterSpec, Record};

/// How cache keys are derived from `(records, filters)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKeyStrategy {
    /// Record count plus first and last registration timestamps.
    ///
    /// Cheap but heuristic: two datasets of equal length sharing boundary
    /// timestamps collide and the second gets the first one's charts.
    #[default]
    Boundary,
    /// SHA-256 over every record. Exact, at the cost of hashing the dataset.
    Content,
}

impl FromStr for CacheKeyStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "boundary" => Ok(CacheKeyStrategy::Boundary),
            "content" | "hash" => Ok(CacheKeyStrategy::Content),
            other => Err(format!("unknown cache key strategy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn boundary_signature(records: &[Record]) -> String {
    let stamp = |record: Option<&Record>| {
        record
            .and_then(|r| r.registered_at)
            .map(|at| at.to_string())
            .unwrap_or_default()
    };
    format!(
        "{}_{}_{}",
        records.len(),
        stamp(records.first()),
        stamp(records.last())
    )
}

fn content_signature(records: &[Record]) -> String {
    let mut hasher = Sha256::new();
    for record in records {
        if let Ok(bytes) = serde_json::to_vec(record) {
            hasher.update(&bytes);
        }
        hasher.update(b"\n");
    }
    BASE64_URL_SAFE_NO_PAD.encode(hasher.finalize())
}

pub fn derive_key(strategy: CacheKeyStrategy, records: &[Record], filters: &FilterSpec) -> CacheKey {
    let data = match strategy {
        CacheKeyStrategy::Boundary => boundary_signature(records),
        CacheKeyStrategy::Content => content_signature(records),
    };
    let filter_json = serde_json::to_string(filters).unwrap_or_default();
    CacheKey(format!("{}_{}", data, filter_json))
}
