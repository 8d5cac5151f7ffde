//! Coordination Registry Module
//!
//! Per-key locks that serialize first computation among concurrent callers.
//!
//! Each in-flight key maps to a slot holding a mutex and a waiter count.
//! The count is raised and lowered only while the map lock is held, and a
//! slot is removed in the same critical section that drops its count to
//! zero. A caller fetching a slot can therefore never pick up one that is
//! being torn down, so one key never has two live locks at once.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use tracing::{debug, error};

use crate::error::RegistryError;

/// Coordination handle for one key
#[derive(Debug)]
struct Slot {
    lock: Arc<Mutex<()>>,
    /// Callers currently holding or waiting for `lock`
    waiters: usize,
}

// == Key Locks ==
/// Registry of per-key coordination handles.
#[derive(Debug)]
pub struct KeyLocks<K> {
    slots: Mutex<HashMap<K, Slot>>,
}

impl<K> Default for KeyLocks<K>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> KeyLocks<K>
where
    K: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    // == Acquire ==
    /// Registers the caller on `key` and blocks until it owns the key's lock.
    ///
    /// The returned guard releases the lock and deregisters the caller when
    /// dropped, on every exit path.
    pub fn acquire(&self, key: &K) -> Result<KeyGuard<'_, K>, RegistryError> {
        let lock = {
            let mut slots = self.slots.lock();
            let slot = match slots.entry(key.clone()) {
                Entry::Occupied(occupied) if occupied.get().waiters == 0 => {
                    occupied.remove();
                    error!("coordination slot held zero waiters; discarded");
                    return Err(RegistryError::OrphanedSlot);
                }
                Entry::Occupied(occupied) => occupied.into_mut(),
                Entry::Vacant(vacant) => {
                    debug!("coordination slot created");
                    vacant.insert(Slot {
                        lock: Arc::new(Mutex::new(())),
                        waiters: 0,
                    })
                }
            };
            slot.waiters += 1;
            Arc::clone(&slot.lock)
        };

        // Block outside the map lock so other keys are never held up
        let guard = lock.lock_arc();

        Ok(KeyGuard {
            registry: self,
            key: key.clone(),
            guard: Some(guard),
        })
    }

    fn release(&self, key: &K) {
        let mut slots = self.slots.lock();
        match slots.get_mut(key) {
            Some(slot) => {
                slot.waiters = slot.waiters.saturating_sub(1);
                if slot.waiters == 0 {
                    slots.remove(key);
                    debug!("coordination slot removed");
                }
            }
            None => error!("released a key with no coordination slot"),
        }
    }

    // == In Flight ==
    /// Number of keys that currently have a live coordination slot.
    pub fn in_flight(&self) -> usize {
        self.slots.lock().len()
    }

    /// Callers holding or awaiting the lock for `key`; zero if none.
    pub fn waiters(&self, key: &K) -> usize {
        self.slots.lock().get(key).map_or(0, |slot| slot.waiters)
    }
}

// == Key Guard ==
/// Exclusive hold on one key's coordination lock.
pub struct KeyGuard<'a, K>
where
    K: Hash + Eq + Clone,
{
    registry: &'a KeyLocks<K>,
    key: K,
    guard: Option<ArcMutexGuard<RawMutex, ()>>,
}

impl<K> Drop for KeyGuard<'_, K>
where
    K: Hash + Eq + Clone,
{
    fn drop(&mut self) {
        // Unlock first so the next waiter can proceed, then deregister
        drop(self.guard.take());
        self.registry.release(&self.key);
    }
}
