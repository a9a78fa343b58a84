//! NanoCache - A sharded in-memory cache server
//!
//! Key/value cache with TTL expiration and LRU eviction, partitioned into
//! independently locked shards and served over a line-oriented TCP protocol.

pub mod cache;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod tasks;

pub use cache::ShardedCache;
pub use config::Config;
pub use error::{CacheError, ProtocolError};
pub use server::{serve, StringCache};
pub use tasks::spawn_cleanup_task;
