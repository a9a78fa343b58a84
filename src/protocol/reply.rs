//! Reply rendering for the line protocol
//!
//! Each reply is one line; the trailing newline is added by the writer.

use std::fmt;

use serde::Serialize;

use crate::cache::CacheStats;
use crate::error::ProtocolError;

/// Literal sent for a GET miss.
pub const NULL_REPLY: &str = "(null)";

/// A reply to one request line.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// `OK`
    Ok,
    /// A stored value, sent verbatim
    Value(String),
    /// `(null)`
    Null,
    /// A decimal count
    Integer(usize),
    /// `PONG`
    Pong,
    /// Counters as single-line JSON
    Stats(CacheStats),
    /// `ERROR: <message>`
    Error(ProtocolError),
}

/// Body of the `STATS` reply: the counters plus the derived hit rate.
#[derive(Debug, Serialize)]
struct StatsBody {
    #[serde(flatten)]
    stats: CacheStats,
    hit_rate: f64,
}

impl From<CacheStats> for StatsBody {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

impl From<Option<String>> for Reply {
    fn from(value: Option<String>) -> Self {
        value.map_or(Reply::Null, Reply::Value)
    }
}

impl From<ProtocolError> for Reply {
    fn from(err: ProtocolError) -> Self {
        Reply::Error(err)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => f.write_str("OK"),
            Reply::Value(value) => f.write_str(value),
            Reply::Null => f.write_str(NULL_REPLY),
            Reply::Integer(n) => write!(f, "{}", n),
            Reply::Pong => f.write_str("PONG"),
            Reply::Stats(stats) => {
                let json = serde_json::to_string(&StatsBody::from(*stats)).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
            Reply::Error(err) => write!(f, "ERROR: {}", err),
        }
    }
}
