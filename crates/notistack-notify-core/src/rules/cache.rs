//! Compiled rule cache.

use std::sync::Arc;

use dashmap::DashMap;

use super::compiler::RulesMap;
use crate::state::NotificationStore;

/// Compiled rules per bucket, keyed `config:{bucket}`.
///
/// Entries are built on first use and dropped by [`RuleCache::invalidate`],
/// which every configuration write calls.
#[derive(Debug, Default)]
pub struct RuleCache {
    entries: DashMap<String, Arc<RulesMap>>,
}

fn cache_key(bucket: &str) -> String {
    format!("config:{bucket}")
}

impl RuleCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiled rules of `bucket`, compiling from `store` on a miss. A bucket
    /// without configuration compiles to an empty map, which is cached too.
    pub fn get_or_compile(&self, bucket: &str, store: &NotificationStore) -> Arc<RulesMap> {
        let key = cache_key(bucket);
        if let Some(hit) = self.entries.get(&key) {
            return Arc::clone(hit.value());
        }
        // Compile under the entry lock so a concurrent invalidate cannot be
        // overtaken by a stale insert.
        let entry = self.entries.entry(key).or_insert_with(|| {
            Arc::new(
                store
                    .get(bucket)
                    .map(|config| RulesMap::compile(&config))
                    .unwrap_or_default(),
            )
        });
        Arc::clone(entry.value())
    }

    /// Drop the entry of `bucket`.
    pub fn invalidate(&self, bucket: &str) {
        self.entries.remove(&cache_key(bucket));
    }

    /// Whether `bucket` has a cached entry.
    #[must_use]
    pub fn contains(&self, bucket: &str) -> bool {
        self.entries.contains_key(&cache_key(bucket))
    }
}
