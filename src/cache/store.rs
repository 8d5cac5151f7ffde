//! Cache Store Module
//!
//! Bounded key/value store combining HashMap storage with LRU tracking and
//! lazy TTL expiration.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::cache::stats::StatsCounters;
use crate::cache::{Cache, CacheEntry, CacheStats, LruTracker};
use crate::config::Config;

// == Cache Store ==
/// Thread-safe cache storage with LRU eviction and TTL support.
///
/// Expiration is lazy: a stale entry reads as absent but keeps its slot, and
/// keeps counting towards capacity, until it is overwritten or evicted.
/// Nothing sweeps the store in the background.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key-value storage
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    /// LRU access tracker
    lru: LruTracker<K>,
    /// Performance counters
    stats: StatsCounters,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Freshness window per entry
    ttl: Duration,
}

impl<K, V> CacheStore<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and TTL.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries the store can hold
    /// * `ttl` - How long an entry stays fresh after being written
    ///
    /// The arguments are not validated. A capacity of zero evicts every
    /// entry as soon as it is written, and a zero TTL makes every entry stale
    /// on arrival. Use [`CacheStore::from_config`] with a checked [`Config`]
    /// to rule both out.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            lru: LruTracker::new(),
            stats: StatsCounters::default(),
            max_entries,
            ttl,
        }
    }

    /// Creates a CacheStore sized from a validated [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_entries, config.ttl)
    }

    // == Get If Fresh ==
    /// Retrieves a value if it exists and is younger than the TTL.
    ///
    /// A hit promotes the key to most recently used. Stale entries are left
    /// in place.
    pub fn get_if_fresh(&self, key: &K) -> Option<V> {
        let entries = self.entries.read();

        match entries.get(key) {
            Some(entry) if entry.is_fresh(self.ttl) => {
                self.lru.hit(key);
                self.stats.record_hit();
                trace!(
                    ttl_remaining_ms =
                        u64::try_from(entry.ttl_remaining(self.ttl).as_millis()).unwrap_or(u64::MAX),
                    "cache hit"
                );
                Some(entry.value.clone())
            }
            _ => {
                self.stats.record_miss();
                trace!("cache miss");
                None
            }
        }
    }

    // == Put ==
    /// Stores a value under `key`, replacing any previous entry and resetting
    /// its age.
    ///
    /// Afterwards the store is shrunk back to capacity. This may silently
    /// remove other, unrelated keys.
    pub fn put(&self, key: K, value: V) {
        let mut entries = self.entries.write();

        entries.insert(key.clone(), CacheEntry::new(value));
        self.lru.hit_or_add(&key);
        self.stats.record_insert();

        let evicted = self.lru.shrink_to(self.max_entries);
        if !evicted.is_empty() {
            for evicted_key in &evicted {
                entries.remove(evicted_key);
            }
            self.stats.record_evictions(evicted.len());
            debug!(count = evicted.len(), "evicted least recently used entries");
        }
    }

    // == Contains Key ==
    /// Checks whether an entry is held for `key`, fresh or not.
    ///
    /// Does not affect recency.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.read().contains_key(key)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }

    // == Length ==
    /// Returns the current number of entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Maximum number of entries kept after each write.
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Freshness window applied to every entry.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<K, V> Cache<K, V> for CacheStore<K, V>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get_if_fresh(&self, key: &K) -> Option<V> {
        CacheStore::get_if_fresh(self, key)
    }

    fn put(&self, key: K, value: V) {
        CacheStore::put(self, key, value)
    }
}
