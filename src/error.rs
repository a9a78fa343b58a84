//! Error types for the cache engine and the line protocol
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised while building a cache.
///
/// Cache operations themselves are total: a miss on `get` is `None`,
/// never an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Construction parameters out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Protocol Error Enum ==
/// Malformed or unknown client requests.
///
/// The `Display` text is exactly what follows `ERROR: ` on the reply line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// First token is not a known command
    #[error("Unknown command")]
    UnknownCommand,

    /// Known command with missing arguments
    #[error("Usage: {0}")]
    Usage(&'static str),

    /// TTL token that is not an integer
    #[error("Invalid ttl: {0}")]
    InvalidTtl(String),

    /// Request line longer than the server accepts
    #[error("Line too long")]
    LineTooLong,
}

// == Result Type Alias ==
/// Convenience Result type for cache construction.
pub type Result<T> = std::result::Result<T, CacheError>;
