//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check capacity, recency and freshness behaviour of the
//! store and tracker over arbitrary operation sequences.

use proptest::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use crate::cache::{CacheStore, LruTracker};

// == Test Configuration ==
const TEST_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Generates cache values
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,32}".prop_map(|s| s)
}

/// A single store operation
#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: u16, value: String },
    Get { key: u16 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (0u16..64, value_strategy()).prop_map(|(key, value)| CacheOp::Put { key, value }),
        (0u16..64).prop_map(|key| CacheOp::Get { key }),
    ]
}

/// Tracker operation against a small key space
#[derive(Debug, Clone)]
enum TrackerOp {
    Hit(u8),
    HitOrAdd(u8),
    ShrinkTo(usize),
}

fn tracker_op_strategy() -> impl Strategy<Value = TrackerOp> {
    prop_oneof![
        (0u8..16).prop_map(TrackerOp::Hit),
        (0u8..16).prop_map(TrackerOp::HitOrAdd),
        (0usize..20).prop_map(TrackerOp::ShrinkTo),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of puts and reads, the store never holds more than
    // its capacity once a put has returned.
    #[test]
    fn prop_capacity_enforcement(
        max_entries in 1usize..20,
        ops in prop::collection::vec(cache_op_strategy(), 1..200)
    ) {
        let store = CacheStore::new(max_entries, TEST_TTL);

        for op in ops {
            match op {
                CacheOp::Put { key, value } => store.put(key, value),
                CacheOp::Get { key } => {
                    let _ = store.get_if_fresh(&key);
                }
            }
            prop_assert!(
                store.len() <= max_entries,
                "Cache size {} exceeds max {}",
                store.len(),
                max_entries
            );
        }
    }

    // The store agrees with a simple reference LRU model: the same keys are
    // present and reads return the last value written.
    #[test]
    fn prop_store_matches_reference_lru(
        max_entries in 1usize..10,
        ops in prop::collection::vec(cache_op_strategy(), 1..200)
    ) {
        let store = CacheStore::new(max_entries, TEST_TTL);
        // front = most recent
        let mut model: VecDeque<(u16, String)> = VecDeque::new();

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    store.put(key, value.clone());
                    model.retain(|(k, _)| *k != key);
                    model.push_front((key, value));
                    model.truncate(max_entries);
                }
                CacheOp::Get { key } => {
                    let got = store.get_if_fresh(&key);
                    let expected = model
                        .iter()
                        .position(|(k, _)| *k == key)
                        .and_then(|pos| model.remove(pos));
                    prop_assert_eq!(got.as_ref(), expected.as_ref().map(|(_, v)| v));
                    if let Some(entry) = expected {
                        model.push_front(entry);
                    }
                }
            }
        }

        prop_assert_eq!(store.len(), model.len());
        for (key, _) in &model {
            prop_assert!(store.contains_key(key), "Key {} missing from store", key);
        }
    }

    // Filling the store and adding one more key evicts exactly the first key
    // inserted, and leaves every other key in place.
    #[test]
    fn prop_lru_eviction_order(
        initial_keys in prop::collection::hash_set(0u32..1000, 2..20),
        new_key in 1000u32..2000,
        new_value in value_strategy()
    ) {
        let keys: Vec<u32> = initial_keys.into_iter().collect();
        let capacity = keys.len();
        let store = CacheStore::new(capacity, TEST_TTL);

        for key in &keys {
            store.put(*key, format!("value_{}", key));
        }
        prop_assert_eq!(store.len(), capacity, "Cache should be at capacity");

        store.put(new_key, new_value);

        prop_assert_eq!(store.len(), capacity, "Cache should remain at capacity");
        prop_assert!(!store.contains_key(&keys[0]), "Oldest key {} should be evicted", keys[0]);
        prop_assert!(store.contains_key(&new_key), "New key should exist");
        for key in keys.iter().skip(1) {
            prop_assert!(store.contains_key(key), "Key {} should still exist", key);
        }
    }

    // A fresh read promotes the key, so the next eviction takes the second
    // oldest key instead.
    #[test]
    fn prop_lru_access_tracking(
        initial_keys in prop::collection::hash_set(0u32..1000, 3..12),
        new_key in 1000u32..2000
    ) {
        let keys: Vec<u32> = initial_keys.into_iter().collect();
        let store = CacheStore::new(keys.len(), TEST_TTL);

        for key in &keys {
            store.put(*key, format!("value_{}", key));
        }

        prop_assert!(store.get_if_fresh(&keys[0]).is_some());
        store.put(new_key, "new".to_string());

        prop_assert!(store.contains_key(&keys[0]), "Accessed key should survive");
        prop_assert!(!store.contains_key(&keys[1]), "Second oldest key should be evicted");
    }

    // The tracker evicts in least-recent-first order and keeps a consistent
    // count across arbitrary hit/add/shrink sequences.
    #[test]
    fn prop_tracker_matches_reference_order(
        ops in prop::collection::vec(tracker_op_strategy(), 1..200)
    ) {
        let tracker = LruTracker::new();
        // front = least recent
        let mut model: Vec<u8> = Vec::new();

        for op in ops {
            match op {
                TrackerOp::Hit(key) => {
                    let found = model.contains(&key);
                    prop_assert_eq!(tracker.hit(&key), found);
                    if found {
                        model.retain(|k| *k != key);
                        model.push(key);
                    }
                }
                TrackerOp::HitOrAdd(key) => {
                    tracker.hit_or_add(&key);
                    model.retain(|k| *k != key);
                    model.push(key);
                }
                TrackerOp::ShrinkTo(max) => {
                    let excess = model.len().saturating_sub(max);
                    let expected: Vec<u8> = model.drain(..excess).collect();
                    prop_assert_eq!(tracker.shrink_to(max), expected);
                }
            }
            prop_assert_eq!(tracker.len(), model.len());
            prop_assert_eq!(tracker.peek_oldest(), model.first().copied());
        }

        let unique: HashSet<u8> = model.iter().copied().collect();
        prop_assert_eq!(unique.len(), model.len(), "Tracker must not hold duplicates");
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // An entry read after its TTL has elapsed is treated as absent, yet it
    // still occupies its slot.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in 0u64..1000,
        value in value_strategy()
    ) {
        let store = CacheStore::new(10, Duration::from_millis(10));

        store.put(key, value.clone());
        prop_assert_eq!(store.get_if_fresh(&key), Some(value));

        std::thread::sleep(Duration::from_millis(15));

        prop_assert_eq!(store.get_if_fresh(&key), None);
        prop_assert!(store.contains_key(&key), "Expiration is lazy");
    }
}
