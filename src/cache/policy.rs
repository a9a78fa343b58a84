//! Eviction Policy Module
//!
//! The narrow interface a shard drives to decide which key to evict.
//! A policy is owned by its shard and only ever touched under the shard's
//! write lock, so implementations need no synchronization of their own.

use std::hash::Hash;

use crate::cache::lru::RecencyList;

// == Eviction Policy ==
/// Bookkeeping hooks called by a shard on every state change.
///
/// The policy must track exactly the keys present in the shard's entry map.
pub trait EvictionPolicy<K> {
    /// A live key was read.
    fn on_access(&mut self, key: &K);

    /// A key was inserted or overwritten.
    fn on_put(&mut self, key: K);

    /// A key left the shard (explicit remove or expiry).
    fn on_remove(&mut self, key: &K);

    /// Picks and forgets the next victim, None when nothing is tracked.
    fn evict(&mut self) -> Option<K>;

    fn contains(&self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);
}

// == FIFO Policy ==
/// First-in-first-out eviction: reads and overwrites never reorder keys.
#[derive(Debug)]
pub struct FifoPolicy<K> {
    queue: RecencyList<K>,
}

impl<K> Default for FifoPolicy<K> {
    fn default() -> Self {
        Self {
            queue: RecencyList::default(),
        }
    }
}

impl<K: Hash + Eq + Clone> FifoPolicy<K> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: Hash + Eq + Clone> EvictionPolicy<K> for FifoPolicy<K> {
    fn on_access(&mut self, _key: &K) {}

    fn on_put(&mut self, key: K) {
        if !self.queue.contains(&key) {
            self.queue.insert(key);
        }
    }

    fn on_remove(&mut self, key: &K) {
        self.queue.remove(key);
    }

    fn evict(&mut self) -> Option<K> {
        self.queue.evict()
    }

    fn contains(&self, key: &K) -> bool {
        self.queue.contains(key)
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn clear(&mut self) {
        self.queue.clear();
    }
}
