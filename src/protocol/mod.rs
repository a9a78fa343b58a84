//! Line Protocol Module
//!
//! One command per line, space separated tokens, one reply line back.
//!
//! # Commands
//! - `PUT <key> <value> <ttl_ms>` - Store a value, replies `OK`
//! - `GET <key>` - Replies the value or `(null)`
//! - `REMOVE <key>` - Delete a key, replies `OK`
//! - `SIZE` - Approximate entry count
//! - `STATS` - Counters as JSON
//! - `PING` - Replies `PONG`

pub mod command;
pub mod reply;

pub use command::{Command, GET_USAGE, PUT_USAGE, REMOVE_USAGE};
pub use reply::{Reply, NULL_REPLY};
