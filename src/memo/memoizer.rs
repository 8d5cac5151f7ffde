//! Memoizer Module
//!
//! Public entry point: wraps an expensive single-argument operation with a
//! TTL/LRU store and per-key call coalescing.

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::cache::{Cache, CacheStore};
use crate::config::Config;
use crate::error::{CacheError, ConfigError, Result};
use crate::memo::KeyLocks;

// == Operation Trait ==
/// An expensive, possibly failing lookup keyed by `K`.
///
/// Implemented for every `Fn(K) -> Result<V, E>` closure.
pub trait Operation<K, V>: Send + Sync {
    type Error;

    fn call(&self, key: K) -> std::result::Result<V, Self::Error>;
}

impl<K, V, E, F> Operation<K, V> for F
where
    F: Fn(K) -> std::result::Result<V, E> + Send + Sync,
{
    type Error = E;

    fn call(&self, key: K) -> std::result::Result<V, E> {
        self(key)
    }
}

// == Memo Stats ==
/// Snapshot of how calls were served.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemoStats {
    /// Times the underlying operation ran
    pub executions: u64,
    /// Callers that waited on another caller and then found its result
    pub coalesced: u64,
    /// Executions that returned an error
    pub failures: u64,
}

#[derive(Debug, Default)]
struct MemoCounters {
    executions: AtomicU64,
    coalesced: AtomicU64,
    failures: AtomicU64,
}

impl MemoCounters {
    fn snapshot(&self) -> MemoStats {
        MemoStats {
            executions: self.executions.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

// == Memoizer ==
/// Memoized, deduplicated view of an [`Operation`].
///
/// Fresh values come straight from the store under a shared lock. On a miss
/// the caller takes the key's coordination lock, re-checks the store, and
/// only then runs the operation. Concurrent callers for the same key wait on
/// that lock and pick the result up from the store. Failures are handed to
/// the caller that ran the operation and are never stored.
pub struct Memoizer<K, V, O, C = CacheStore<K, V>> {
    op: O,
    cache: C,
    in_flight: KeyLocks<K>,
    counters: MemoCounters,
    _value: PhantomData<fn() -> V>,
}

impl<K, V, O> Memoizer<K, V, O, CacheStore<K, V>>
where
    K: Hash + Eq + Clone + Debug + Send + Sync,
    V: Clone + Send + Sync,
    O: Operation<K, V>,
{
    // == Constructors ==
    /// Wraps `op` with the default configuration (1000 entries, 5 minutes).
    pub fn new(op: O) -> Self {
        Self::with_config(op, Config::default())
    }

    /// Wraps `op` with an explicit capacity and TTL.
    pub fn with_options(
        op: O,
        max_entries: usize,
        ttl: Duration,
    ) -> std::result::Result<Self, ConfigError> {
        Ok(Self::with_config(op, Config::new(max_entries, ttl)?))
    }

    /// Wraps `op` with a prepared [`Config`].
    pub fn with_config(op: O, config: Config) -> Self {
        debug!(
            max_entries = config.max_entries,
            ttl_ms = u64::try_from(config.ttl.as_millis()).unwrap_or(u64::MAX),
            "memoizer created"
        );
        Self::with_cache(op, CacheStore::from_config(&config))
    }
}

impl<K, V, O, C> Memoizer<K, V, O, C>
where
    K: Hash + Eq + Clone + Debug + Send + Sync,
    V: Clone + Send + Sync,
    O: Operation<K, V>,
    C: Cache<K, V>,
{
    /// Wraps `op` over a caller-supplied store.
    pub fn with_cache(op: O, cache: C) -> Self {
        Self {
            op,
            cache,
            in_flight: KeyLocks::new(),
            counters: MemoCounters::default(),
            _value: PhantomData,
        }
    }

    // == Call ==
    /// Returns the value for `key`, running the operation at most once per
    /// miss no matter how many callers ask concurrently.
    ///
    /// Blocks while another caller is computing the same key. There is no
    /// timeout and no retry; a failure is returned as-is and leaves the store
    /// untouched so the next call tries again.
    pub fn call(&self, key: K) -> Result<V, O::Error> {
        if let Some(value) = self.cache.get_if_fresh(&key) {
            return Ok(value);
        }

        let _guard = self.in_flight.acquire(&key)?;

        // Someone may have filled it while we waited for the lock
        if let Some(value) = self.cache.get_if_fresh(&key) {
            self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
            trace!(?key, "served by a concurrent computation");
            return Ok(value);
        }

        self.counters.executions.fetch_add(1, Ordering::Relaxed);
        debug!(?key, "running underlying operation");

        match self.op.call(key.clone()) {
            Ok(value) => {
                self.cache.put(key, value.clone());
                Ok(value)
            }
            Err(err) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                warn!(?key, "underlying operation failed; nothing cached");
                Err(CacheError::Operation(err))
            }
        }
    }

    /// Turns the memoizer into a plain function with the wrapped signature.
    pub fn into_fn(self) -> impl Fn(K) -> Result<V, O::Error> + Send + Sync {
        move |key| self.call(key)
    }

    // == Introspection ==
    /// The store backing this memoizer.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Keys with a computation running or queued right now.
    pub fn in_flight(&self) -> usize {
        self.in_flight.in_flight()
    }

    /// Returns how calls have been served so far.
    pub fn stats(&self) -> MemoStats {
        self.counters.snapshot()
    }
}
