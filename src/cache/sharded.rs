//! Sharded Cache Module
//!
//! Routes every key to exactly one [`Shard`]. The shard array is fixed at
//! construction and read without synchronization; all locking happens
//! inside the selected shard, and no caller ever holds two shard locks.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheStats, EvictionPolicy, LruPolicy, Shard};
use crate::error::{CacheError, Result};

// == Hash Spreading ==
/// Folds the upper 16 bits into the lower 16 so masking by a small shard
/// count still sees the whole hash.
#[inline]
pub fn spread(hash: u32) -> u32 {
    hash ^ (hash >> 16)
}

// == Sharded Cache ==
/// Concurrent cache made of `2^n` independently locked shards.
#[derive(Debug)]
pub struct ShardedCache<K, V, P = LruPolicy<K>> {
    shards: Box<[Shard<K, V, P>]>,
    mask: usize,
    hasher: RandomState,
    capacity: usize,
    shard_capacity: usize,
}

impl<K, V> ShardedCache<K, V, LruPolicy<K>>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates an LRU cache holding about `capacity` entries spread over
    /// `concurrency` rounded up to a power of two shards.
    ///
    /// Each shard holds `ceil(capacity / shard_count)` entries, so the
    /// total may exceed `capacity` by less than one entry per shard.
    pub fn new(capacity: usize, concurrency: usize) -> Result<Self> {
        Self::with_policy(capacity, concurrency, LruPolicy::with_capacity)
    }
}

impl<K, V, P> ShardedCache<K, V, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    P: EvictionPolicy<K>,
{
    /// Creates a cache whose shards use policies built by `make_policy`,
    /// which receives the per-shard capacity.
    pub fn with_policy<F>(capacity: usize, concurrency: usize, mut make_policy: F) -> Result<Self>
    where
        F: FnMut(usize) -> P,
    {
        if capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }
        if concurrency == 0 {
            return Err(CacheError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }

        let shard_count = concurrency.checked_next_power_of_two().ok_or_else(|| {
            CacheError::InvalidConfig(format!("concurrency {} is too large", concurrency))
        })?;
        let shard_capacity = capacity.div_ceil(shard_count);

        let shards = (0..shard_count)
            .map(|_| Shard::with_policy(shard_capacity, make_policy(shard_capacity)))
            .collect();

        debug!(capacity, shard_count, shard_capacity, "sharded cache initialized");

        Ok(Self {
            shards,
            mask: shard_count - 1,
            hasher: RandomState::new(),
            capacity,
            shard_capacity,
        })
    }

    // == Routing ==
    /// Index of the shard that owns `key`.
    pub fn shard_index(&self, key: &K) -> usize {
        let hash = self.hasher.hash_one(key) as u32;
        spread(hash) as usize & self.mask
    }

    fn shard_for(&self, key: &K) -> &Shard<K, V, P> {
        &self.shards[self.shard_index(key)]
    }

    // == Operations ==
    /// Stores a value that expires `ttl` from now.
    pub fn put(&self, key: K, value: V, ttl: Duration) {
        self.shard_for(&key).put(key, value, ttl);
    }

    /// Returns a live value and marks it most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        self.shard_for(key).get(key)
    }

    /// Returns a live value without changing recency.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.shard_for(key).peek(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.shard_for(key).contains_key(key)
    }

    /// Removes a key. Returns whether it was present.
    pub fn remove(&self, key: &K) -> bool {
        self.shard_for(key).remove(key)
    }

    /// Sum of shard sizes. Shards are sampled one after another, so the
    /// total is approximate under concurrent writes.
    pub fn size(&self) -> usize {
        self.shards.iter().map(Shard::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(Shard::is_empty)
    }

    /// Drops every entry, one shard at a time.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.clear();
        }
    }

    /// Removes expired entries from every shard. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        self.shards.iter().map(Shard::purge_expired).sum()
    }

    /// Counters summed across shards.
    pub fn stats(&self) -> CacheStats {
        self.shards
            .iter()
            .map(Shard::stats)
            .fold(CacheStats::default(), CacheStats::merge)
    }

    // == Accessors ==
    /// The requested total capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn shard_capacity(&self) -> usize {
        self.shard_capacity
    }

    #[cfg(test)]
    pub(crate) fn shards(&self) -> &[Shard<K, V, P>] {
        &self.shards
    }
}
