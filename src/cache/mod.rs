//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Cache Trait ==
/// The store capabilities a memoizer needs.
///
/// Implemented by [`CacheStore`]; callers can supply their own to swap the
/// eviction policy or to observe traffic in tests.
pub trait Cache<K, V>: Send + Sync {
    /// Returns the value for `key` if present and still fresh.
    fn get_if_fresh(&self, key: &K) -> Option<V>;

    /// Stores `value` under `key` with a fresh timestamp.
    fn put(&self, key: K, value: V);
}

impl<K, V, C> Cache<K, V> for std::sync::Arc<C>
where
    C: Cache<K, V> + ?Sized,
{
    fn get_if_fresh(&self, key: &K) -> Option<V> {
        (**self).get_if_fresh(key)
    }

    fn put(&self, key: K, value: V) {
        (**self).put(key, value)
    }
}
