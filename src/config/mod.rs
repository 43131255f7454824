use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::cache::{CacheKeyStrategy, DEFAULT_CACHE_ENTRIES};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
    pub key_strategy: CacheKeyStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: DEFAULT_CACHE_ENTRIES,
            key_strategy: CacheKeyStrategy::Boundary,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = lookup("SVCDASH_CACHE_ENABLED")
            .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        let max_entries = match lookup("SVCDASH_CACHE_MAX_ENTRIES") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("SVCDASH_CACHE_MAX_ENTRIES must be a number, got '{v}'"))?,
            None => DEFAULT_CACHE_ENTRIES,
        };

        let key_strategy = match lookup("SVCDASH_CACHE_KEY") {
            Some(v) => v.parse::<CacheKeyStrategy>().unwrap_or_else(|e| {
                tracing::warn!(
                    "{e}, falling back to 'boundary'. Supported values: boundary, content"
                );
                CacheKeyStrategy::Boundary
            }),
            None => CacheKeyStrategy::Boundary,
        };

        let default_filter = lookup("SVCDASH_LOG").unwrap_or_else(|| "info".to_string());

        Ok(Config {
            cache: CacheConfig {
                enabled,
                max_entries,
                key_strategy,
            },
            logging: LoggingConfig { default_filter },
        })
    }
}
