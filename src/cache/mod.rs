//! Cache Module
//!
//! Sharded in-memory caching with TTL expiration and pluggable eviction
//! (LRU by default).

mod entry;
mod lru;
mod policy;
mod shard;
mod sharded;
mod stats;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::{LruPolicy, RecencyList};
pub use policy::{EvictionPolicy, FifoPolicy};
pub use shard::Shard;
pub use sharded::{spread, ShardedCache};
pub use stats::{CacheStats, ShardCounters};
