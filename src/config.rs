//! Configuration Module
//!
//! Handles loading server configuration from positional arguments and
//! environment variables.

use std::env;

use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CAPACITY: usize = 1024;
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Server configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TCP listen port
    pub port: u16,
    /// Total number of items the cache can hold
    pub capacity: usize,
    /// Requested shard count (rounded up to a power of two by the cache)
    pub concurrency: usize,
    /// Background cleanup interval in seconds, 0 disables the sweeper
    pub cleanup_interval: u64,
}

impl Config {
    /// Loads the environment, then applies the process arguments.
    pub fn load() -> Self {
        Self::from_env().with_args(env::args().skip(1))
    }

    /// Creates a Config with environment overrides applied to the defaults.
    ///
    /// # Environment Variables
    /// - `NANOCACHE_CONCURRENCY` - Shard count hint (default: 16)
    /// - `NANOCACHE_CLEANUP_INTERVAL` - Sweeper interval in seconds (default: 0, disabled)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            concurrency: env::var("NANOCACHE_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.concurrency),
            cleanup_interval: env::var("NANOCACHE_CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval),
            ..defaults
        }
    }

    /// Applies the positional arguments `[port] [capacity]`.
    ///
    /// A value that is not a positive integer is reported and ignored.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = args.into_iter();

        if let Some(arg) = args.next() {
            match arg.as_ref().parse::<u16>() {
                Ok(port) if port > 0 => self.port = port,
                _ => warn!(
                    "Invalid port number '{}'. Using default: {}",
                    arg.as_ref(),
                    self.port
                ),
            }
        }

        if let Some(arg) = args.next() {
            match arg.as_ref().parse::<usize>() {
                Ok(capacity) if capacity > 0 => self.capacity = capacity,
                _ => warn!(
                    "Invalid capacity '{}'. Using default: {}",
                    arg.as_ref(),
                    self.capacity
                ),
            }
        }

        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            capacity: DEFAULT_CAPACITY,
            concurrency: DEFAULT_CONCURRENCY,
            cleanup_interval: 0,
        }
    }
}
