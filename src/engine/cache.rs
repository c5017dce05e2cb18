// src/engine/cache.rs
// =============================================================================
// Memoizes external check results by URL.
//
// A link to the same URL from fifty pages is probed once; every page then
// reports the same outcome. Workers write into the cache concurrently, so it
// is backed by a DashMap (a sharded, lock-per-shard HashMap) behind an Arc.
// Cloning a ResultCache hands out another handle to the same map.
// =============================================================================

use crate::checker::http::{normalize_url, ExternalCheckResult};
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    entries: Arc<DashMap<String, ExternalCheckResult>>,
}

impl ResultCache {
    pub fn new() -> Self {
        ResultCache::default()
    }

    /// Looks up a URL; protocol-relative URLs are normalized first
    pub fn get(&self, url: &str) -> Option<ExternalCheckResult> {
        self.entries
            .get(&normalize_url(url))
            .map(|entry| entry.value().clone())
    }

    /// Stores the result for a URL, replacing any earlier one
    pub fn put(&self, url: &str, result: ExternalCheckResult) {
        self.entries.insert(normalize_url(url), result);
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(&normalize_url(url))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
