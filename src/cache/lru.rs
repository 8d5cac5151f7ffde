//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.
//!
//! Keys live in a doubly-linked list threaded through a slab of nodes, with a
//! key -> slot index beside it, so every operation is O(1) amortized.

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::Mutex;

/// Node in the recency list
#[derive(Debug)]
struct Node<K> {
    key: K,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Unsynchronized recency order.
///
/// - Head = Most recently used
/// - Tail = Least recently used
#[derive(Debug)]
struct RecencyList<K> {
    index: HashMap<K, usize>,
    nodes: Vec<Option<Node<K>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
}

impl<K> RecencyList<K>
where
    K: Hash + Eq + Clone,
{
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            nodes: Vec::new(),
            head: None,
            tail: None,
            free_list: Vec::new(),
        }
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn node(&self, idx: usize) -> Option<&Node<K>> {
        self.nodes.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<K>> {
        self.nodes.get_mut(idx).and_then(Option::as_mut)
    }

    fn hit(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&idx) => {
                self.move_to_front(idx);
                true
            }
            None => false,
        }
    }

    fn add(&mut self, key: K) {
        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            prev: None,
            next: None,
        });
        self.push_front(idx);
        self.index.insert(key, idx);
    }

    fn pop_back(&mut self) -> Option<K> {
        let tail_idx = self.tail?;
        self.unlink(tail_idx);
        let node = self.nodes[tail_idx].take()?;
        self.index.remove(&node.key);
        self.free_list.push(tail_idx);
        Some(node.key)
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return; // Already at front
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = old_head;
        }
        if let Some(head_idx) = old_head {
            if let Some(head) = self.node_mut(head_idx) {
                head.prev = Some(idx);
            }
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.node(idx) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = self.node_mut(prev_idx) {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = self.node_mut(next_idx) {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            self.nodes.push(None);
            self.nodes.len() - 1
        }
    }
}

// == LRU Tracker ==
/// Thread-safe recency order over keys.
///
/// Serialized with its own lock, independent of whatever store composes it.
/// Both reads and writes move list nodes, so every operation is exclusive.
#[derive(Debug)]
pub struct LruTracker<K> {
    inner: Mutex<RecencyList<K>>,
}

impl<K> Default for LruTracker<K>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> LruTracker<K>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RecencyList::new()),
        }
    }

    // == Hit ==
    /// Marks a tracked key as most recently used.
    ///
    /// Returns false, and changes nothing, if the key is not tracked.
    pub fn hit(&self, key: &K) -> bool {
        self.inner.lock().hit(key)
    }

    // == Hit Or Add ==
    /// Marks a key as most recently used, starting to track it if new.
    pub fn hit_or_add(&self, key: &K) {
        let mut list = self.inner.lock();
        if !list.hit(key) {
            list.add(key.clone());
        }
    }

    // == Shrink To ==
    /// Evicts least recently used keys until at most `max` remain.
    ///
    /// Evicted keys are returned oldest first. Empty when already within `max`.
    pub fn shrink_to(&self, max: usize) -> Vec<K> {
        let mut list = self.inner.lock();
        let excess = list.len().saturating_sub(max);
        let mut evicted = Vec::with_capacity(excess);
        for _ in 0..excess {
            match list.pop_back() {
                Some(key) => evicted.push(key),
                None => break,
            }
        }
        evicted
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<K> {
        let list = self.inner.lock();
        list.tail
            .and_then(|idx| list.node(idx))
            .map(|node| node.key.clone())
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Contains ==
    /// Checks if a key is being tracked, without touching its position.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().index.contains_key(key)
    }
}
