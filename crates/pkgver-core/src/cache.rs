//! In-memory TTL cache shared by registry clients.
//!
//! Keys are strings namespaced per ecosystem (`npm:<name>`,
//! `pypi:<name>`, `maven:<group>:<artifact>`, `dockerhub:<image>`, …);
//! values are whatever parsed registry summary the owning client needs to
//! answer both plain and constrained lookups without refetching.

use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Default time-to-live for cache entries: 12 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Maximum number of cached entries to prevent unbounded memory growth.
const MAX_CACHE_ENTRIES: usize = 1000;

/// A cached value with its insertion instant.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Concurrent key→value cache with per-entry TTL-on-read.
///
/// Reads never block other reads (`DashMap` shards internally); writers
/// serialise with readers per shard. A `get` that finds an entry older
/// than the TTL removes it and reports a miss, so stale values are never
/// returned. There is no stampede protection: concurrent misses for the
/// same key may all fetch, and the last writer's value stands.
///
/// # Examples
///
/// ```
/// use pkgver_core::cache::TtlCache;
/// use std::time::Duration;
///
/// let cache: TtlCache<String> = TtlCache::with_ttl(Duration::from_secs(60));
/// cache.put("npm:react".into(), "18.2.0".into());
/// assert_eq!(cache.get("npm:react"), Some("18.2.0".into()));
/// assert_eq!(cache.get("npm:vue"), None);
/// ```
pub struct TtlCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Creates a cache with the default 12-hour TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Creates a cache with an explicit TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Returns the stored value iff its insertion time is within TTL of
    /// now. Expired entries are removed on the way out.
    pub fn get(&self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                if entry.inserted_at.elapsed() < self.ttl {
                    return Some(entry.value.clone());
                }
                true
            }
            None => false,
        };

        if expired {
            self.entries.remove(key);
        }
        None
    }

    /// Inserts a value, stamping it with the current instant.
    ///
    /// An existing entry for the key is replaced, TTL restarted.
    pub fn put(&self, key: String, value: V) {
        if self.entries.len() >= MAX_CACHE_ENTRIES {
            self.evict_entries();
        }

        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Returns the number of entries, including any not yet expired-on-read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache contains no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evicts the oldest ~10% of entries when capacity is reached.
    fn evict_entries(&self) {
        let target_removals = MAX_CACHE_ENTRIES / 10;

        let mut by_age: Vec<(String, Instant)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().inserted_at))
            .collect();
        by_age.sort_by_key(|(_, inserted_at)| *inserted_at);

        let mut removed = 0;
        for (key, _) in by_age.iter().take(target_removals) {
            self.entries.remove(key);
            removed += 1;
        }

        tracing::debug!("evicted {removed} cache entries");
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
