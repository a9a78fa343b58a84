//! Cache Shard Module
//!
//! One independently locked partition of the cache: an entry map and an
//! eviction policy kept in step under a single reader/writer lock.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::error;

use crate::cache::{CacheEntry, CacheStats, EvictionPolicy, LruPolicy, ShardCounters};

// == Shard State ==
/// Everything the shard lock protects. The entry map and the policy must
/// always track the same key set.
#[derive(Debug)]
struct ShardState<K, V, P> {
    entries: HashMap<K, CacheEntry<V>>,
    policy: P,
}

// == Shard ==
/// Capacity-bounded, TTL-aware store for the keys routed to it.
///
/// `put`, `get`, `remove` and `purge_expired` take the write lock for their
/// whole duration. `get` is a writer because a hit promotes the key in the
/// policy. `peek`, `contains_key` and `len` only read.
#[derive(Debug)]
pub struct Shard<K, V, P = LruPolicy<K>> {
    state: RwLock<ShardState<K, V, P>>,
    counters: ShardCounters,
    capacity: usize,
}

impl<K, V> Shard<K, V, LruPolicy<K>>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates an LRU shard holding at most `capacity` entries.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, LruPolicy::with_capacity(capacity))
    }
}

impl<K, V, P> Shard<K, V, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    P: EvictionPolicy<K>,
{
    /// Creates a shard driven by the given eviction policy.
    ///
    /// # Panics
    /// Panics if `capacity` is zero. [`ShardedCache`](crate::cache::ShardedCache)
    /// validates its capacity before building shards.
    pub fn with_policy(capacity: usize, policy: P) -> Self {
        assert!(capacity > 0, "shard capacity must be at least 1");
        Self {
            state: RwLock::new(ShardState {
                entries: HashMap::with_capacity(capacity),
                policy,
            }),
            counters: ShardCounters::new(),
            capacity,
        }
    }

    // == Put ==
    /// Stores a value that expires `ttl` from now.
    ///
    /// Overwriting an existing key replaces its TTL and never evicts. A new
    /// key arriving at capacity evicts the policy's victim first, whether or
    /// not that victim has already expired.
    pub fn put(&self, key: K, value: V, ttl: Duration) {
        let mut guard = self.state.write();
        let ShardState { entries, policy } = &mut *guard;
        let entry = CacheEntry::new(value, ttl, Instant::now());

        if let Some(slot) = entries.get_mut(&key) {
            *slot = entry;
            policy.on_put(key);
            return;
        }

        if entries.len() >= self.capacity {
            match policy.evict() {
                Some(victim) => {
                    entries.remove(&victim);
                    self.counters.record_eviction();
                }
                None => {
                    error!(
                        entries = entries.len(),
                        capacity = self.capacity,
                        "eviction policy is empty while the shard is full"
                    );
                    panic!("cache shard invariant violated: full shard with nothing to evict");
                }
            }
        }

        entries.insert(key.clone(), entry);
        policy.on_put(key);
    }

    // == Get ==
    /// Returns the value if present and live, promoting the key.
    ///
    /// An expired entry found here is removed before reporting a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut guard = self.state.write();
        let ShardState { entries, policy } = &mut *guard;

        let expired = match entries.get(key) {
            Some(entry) => entry.is_expired_at(Instant::now()),
            None => {
                self.counters.record_miss();
                return None;
            }
        };

        if expired {
            entries.remove(key);
            policy.on_remove(key);
            self.counters.record_expirations(1);
            self.counters.record_miss();
            return None;
        }

        policy.on_access(key);
        self.counters.record_hit();
        entries.get(key).map(|entry| entry.value.clone())
    }

    // == Peek ==
    /// Reads a live value under the shared lock without touching recency.
    ///
    /// Expired entries read as absent but are left for the next writer.
    pub fn peek(&self, key: &K) -> Option<V> {
        let guard = self.state.read();
        let now = Instant::now();
        guard
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value.clone())
    }

    /// Checks for a live entry without touching recency.
    pub fn contains_key(&self, key: &K) -> bool {
        let guard = self.state.read();
        let now = Instant::now();
        guard
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    // == Remove ==
    /// Deletes a key from both structures. Returns whether it was present.
    pub fn remove(&self, key: &K) -> bool {
        let mut guard = self.state.write();
        let ShardState { entries, policy } = &mut *guard;

        if entries.remove(key).is_some() {
            policy.on_remove(key);
            true
        } else {
            false
        }
    }

    // == Purge Expired ==
    /// Removes every expired entry. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let mut guard = self.state.write();
        let ShardState { entries, policy } = &mut *guard;
        let now = Instant::now();

        let expired: Vec<K> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.remove(key);
            policy.on_remove(key);
        }

        self.counters.record_expirations(expired.len() as u64);
        expired.len()
    }

    /// Drops every entry. Counters are kept.
    pub fn clear(&self) {
        let mut guard = self.state.write();
        guard.entries.clear();
        guard.policy.clear();
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of this shard's counters.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.len())
    }

    /// Panics unless the entry map and policy agree and capacity holds.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let guard = self.state.read();
        assert!(guard.entries.len() <= self.capacity, "shard over capacity");
        assert_eq!(guard.entries.len(), guard.policy.len(), "map and policy sizes differ");
        for key in guard.entries.keys() {
            assert!(guard.policy.contains(key), "policy lost a key");
        }
    }
}

#[cfg(test)]
impl<K, V> Shard<K, V, LruPolicy<K>>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Keys from most to least recently used.
    pub(crate) fn recency_order(&self) -> Vec<K> {
        self.state.read().policy.order().iter().cloned().collect()
    }

    pub(crate) fn assert_well_formed(&self) {
        self.assert_consistent();
        self.state.read().policy.order().assert_well_formed();
    }
}
