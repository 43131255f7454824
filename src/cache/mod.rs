//! Bounded memoization in front of chart aggregation
//!
//! The cache is an optimization only: a miss, a bypass and a hit all yield
//! the same bundle for the same inputs. Eviction is FIFO by insertion.

pub mod key;

pub use key::{derive_key, CacheKey, CacheKeyStrategy};

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

use crate::analytics::{aggregate, ChartDataBundle};
use crate::config::CacheConfig;
use crate::models::{FilterSpec, Record};

pub const DEFAULT_CACHE_ENTRIES: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<CacheKey, Arc<ChartDataBundle>>,
    /// Insertion order, oldest first
    order: VecDeque<CacheKey>,
    hits: u64,
    misses: u64,
}

impl CacheInner {
    fn insert(&mut self, key: CacheKey, bundle: Arc<ChartDataBundle>, capacity: usize) {
        if self.entries.insert(key.clone(), bundle).is_none() {
            self.order.push_back(key);
        }

        while self.entries.len() > capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            debug!("Evicted chart cache entry {}", oldest);
        }
    }
}

/// Chart aggregation cache, one per dashboard session
#[derive(Debug)]
pub struct ChartCache {
    capacity: usize,
    strategy: CacheKeyStrategy,
    inner: Mutex<CacheInner>,
}

impl ChartCache {
    pub fn new(capacity: usize, strategy: CacheKeyStrategy) -> Self {
        Self {
            capacity,
            strategy,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, config.key_strategy)
    }

    pub fn strategy(&self) -> CacheKeyStrategy {
        self.strategy
    }

    /// Cached bundle for `(records, filters)`, aggregating on a miss
    pub fn chart_data(&self, records: &[Record], filters: &FilterSpec) -> Arc<ChartDataBundle> {
        let key = derive_key(self.strategy, records, filters);

        {
            let mut inner = self.inner.lock();
            if let Some(bundle) = inner.entries.get(&key).cloned() {
                inner.hits += 1;
                debug!("Chart cache hit");
                return bundle;
            }
            inner.misses += 1;
        }

        // Aggregate without holding the lock; a concurrent miss on the same
        // key computes an identical bundle
        let bundle = Arc::new(aggregate(records, filters));
        self.inner
            .lock()
            .insert(key, Arc::clone(&bundle), self.capacity);
        debug!("Chart cache miss, aggregated {} records", records.len());
        bundle
    }

    /// Recompute regardless of what is cached and store the fresh result
    pub fn refresh(&self, records: &[Record], filters: &FilterSpec) -> Arc<ChartDataBundle> {
        let key = derive_key(self.strategy, records, filters);
        let bundle = Arc::new(aggregate(records, filters));
        self.inner
            .lock()
            .insert(key, Arc::clone(&bundle), self.capacity);
        bundle
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
        debug!("Chart cache cleared");
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            size: inner.entries.len(),
            capacity: self.capacity,
            hits: inner.hits,
            misses: inner.misses,
        }
    }
}

impl Default for ChartCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_ENTRIES, CacheKeyStrategy::default())
    }
}
