//! Per-entity permission cache
//!
//! Entries map an [`EntityKey`] to an immutable [`PermissionSet`] snapshot.
//! There is no TTL and no eviction: an entry is created on first resolution
//! and overwritten wholesale after every mutation of that entity.
//!
//! # Thread Safety
//!
//! Backed by `DashMap`, so the cache can be shared across tasks behind an
//! `Arc`. A first resolution only fills a vacant entry, so it can never
//! replace a refresh stored by a concurrent mutation. Two concurrent
//! refreshes of the same entity resolve last-writer-wins. Snapshots already
//! handed out are never modified.

use dashmap::DashMap;
use std::sync::Arc;

use crate::permission_set::PermissionSet;
use crate::types::EntityKey;

const HITS: &str = "hits";
const MISSES: &str = "misses";
const REFRESHES: &str = "refreshes";

/// Permission cache keyed by entity type and identity
#[derive(Debug)]
pub struct PermissionCache {
    entries: DashMap<EntityKey, Arc<PermissionSet>>,

    /// Whether hit/miss counters are recorded
    track_stats: bool,

    stats: DashMap<&'static str, usize>,
}

impl PermissionCache {
    /// Create an empty cache that records statistics
    pub fn new() -> Self {
        Self::with_stats(true)
    }

    /// Create an empty cache, optionally recording statistics
    pub fn with_stats(track_stats: bool) -> Self {
        Self {
            entries: DashMap::new(),
            track_stats,
            stats: DashMap::new(),
        }
    }

    /// Look up a snapshot, counting a hit or a miss
    pub fn get(&self, key: &EntityKey) -> Option<Arc<PermissionSet>> {
        match self.entries.get(key) {
            Some(entry) => {
                self.increment_stat(HITS);
                Some(Arc::clone(entry.value()))
            }
            None => {
                self.increment_stat(MISSES);
                None
            }
        }
    }

    /// Look up a snapshot without touching the counters
    pub fn peek(&self, key: &EntityKey) -> Option<Arc<PermissionSet>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Populate an entry on first resolution.
    ///
    /// An entry that already exists is kept and returned instead.
    pub fn insert(&self, key: EntityKey, permissions: PermissionSet) -> Arc<PermissionSet> {
        let entry = self.entries.entry(key).or_insert_with(|| Arc::new(permissions));
        Arc::clone(entry.value())
    }

    /// Overwrite an entry after a mutation
    pub fn refresh(&self, key: EntityKey, permissions: PermissionSet) -> Arc<PermissionSet> {
        self.increment_stat(REFRESHES);
        let snapshot = Arc::new(permissions);
        self.entries.insert(key, Arc::clone(&snapshot));
        snapshot
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop every entry and reset the counters
    pub fn clear(&self) {
        self.entries.clear();
        self.stats.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.get_stat(HITS),
            misses: self.get_stat(MISSES),
            refreshes: self.get_stat(REFRESHES),
            entries: self.entries.len(),
        }
    }

    fn increment_stat(&self, key: &'static str) {
        if !self.track_stats {
            return;
        }
        self.stats
            .entry(key)
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    fn get_stat(&self, key: &str) -> usize {
        self.stats.get(key).map(|v| *v).unwrap_or(0)
    }
}

impl Default for PermissionCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    /// Overwrites caused by mutations
    pub refreshes: usize,
    pub entries: usize,
}

impl CacheStats {
    /// Calculate cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
