//! Request parsing for the line protocol
//!
//! Turns one client line into a [`Command`].

use std::time::Duration;

use crate::error::ProtocolError;

pub const PUT_USAGE: &str = "PUT <key> <value> <ttl_ms>";
pub const GET_USAGE: &str = "GET <key>";
pub const REMOVE_USAGE: &str = "REMOVE <key>";

/// A parsed client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `PUT <key> <value> <ttl_ms>`
    Put {
        key: String,
        value: String,
        ttl: Duration,
    },
    /// `GET <key>`
    Get { key: String },
    /// `REMOVE <key>`
    Remove { key: String },
    /// `SIZE`
    Size,
    /// `STATS`
    Stats,
    /// `PING`
    Ping,
}

impl Command {
    /// Parses a request line.
    ///
    /// Tokens are whitespace separated and the command name is case
    /// insensitive. Tokens past the expected arguments are ignored.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let mut tokens = line.split_whitespace();
        let name = tokens.next().unwrap_or_default().to_ascii_uppercase();

        match name.as_str() {
            "PUT" => {
                let (Some(key), Some(value), Some(ttl)) = (tokens.next(), tokens.next(), tokens.next())
                else {
                    return Err(ProtocolError::Usage(PUT_USAGE));
                };
                Ok(Command::Put {
                    key: key.to_string(),
                    value: value.to_string(),
                    ttl: parse_ttl(ttl)?,
                })
            }
            "GET" => {
                let key = tokens.next().ok_or(ProtocolError::Usage(GET_USAGE))?;
                Ok(Command::Get {
                    key: key.to_string(),
                })
            }
            "REMOVE" => {
                let key = tokens.next().ok_or(ProtocolError::Usage(REMOVE_USAGE))?;
                Ok(Command::Remove {
                    key: key.to_string(),
                })
            }
            "SIZE" => Ok(Command::Size),
            "STATS" => Ok(Command::Stats),
            "PING" => Ok(Command::Ping),
            _ => Err(ProtocolError::UnknownCommand),
        }
    }
}

/// Parses a millisecond TTL. Negative values clamp to zero, which makes
/// the entry expire on its next read.
fn parse_ttl(token: &str) -> Result<Duration, ProtocolError> {
    let millis: i64 = token
        .parse()
        .map_err(|_| ProtocolError::InvalidTtl(token.to_string()))?;
    Ok(Duration::from_millis(millis.max(0).unsigned_abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_put() {
        let cmd = Command::parse("PUT key1 value1 5000").unwrap();
        assert_eq!(
            cmd,
            Command::Put {
                key: "key1".to_string(),
                value: "value1".to_string(),
                ttl: Duration::from_millis(5000),
            }
        );
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            Command::parse("get key1").unwrap(),
            Command::Get {
                key: "key1".to_string()
            }
        );
        assert_eq!(Command::parse("pInG").unwrap(), Command::Ping);
    }

    #[test]
    fn test_parse_keeps_key_and_value_case() {
        let cmd = Command::parse("put MyKey MyValue 1").unwrap();
        assert!(matches!(cmd, Command::Put { ref key, ref value, .. } if key == "MyKey" && value == "MyValue"));
    }

    #[test]
    fn test_parse_put_missing_args() {
        assert_eq!(
            Command::parse("PUT key value"),
            Err(ProtocolError::Usage(PUT_USAGE))
        );
        assert_eq!(Command::parse("PUT"), Err(ProtocolError::Usage(PUT_USAGE)));
    }

    #[test]
    fn test_parse_get_missing_key() {
        assert_eq!(Command::parse("GET"), Err(ProtocolError::Usage(GET_USAGE)));
    }

    #[test]
    fn test_parse_remove() {
        assert_eq!(
            Command::parse("REMOVE k").unwrap(),
            Command::Remove {
                key: "k".to_string()
            }
        );
        assert_eq!(
            Command::parse("REMOVE"),
            Err(ProtocolError::Usage(REMOVE_USAGE))
        );
    }

    #[test]
    fn test_parse_unknown_and_empty() {
        assert_eq!(Command::parse("FLUSH"), Err(ProtocolError::UnknownCommand));
        assert_eq!(Command::parse(""), Err(ProtocolError::UnknownCommand));
        assert_eq!(Command::parse("   "), Err(ProtocolError::UnknownCommand));
    }

    #[test]
    fn test_parse_ignores_extra_tokens_and_crlf() {
        assert_eq!(
            Command::parse("GET k extra\r").unwrap(),
            Command::Get {
                key: "k".to_string()
            }
        );
    }

    #[test]
    fn test_parse_ttl_policy() {
        let zero = Command::parse("PUT k v 0").unwrap();
        assert!(matches!(zero, Command::Put { ttl, .. } if ttl == Duration::ZERO));

        let negative = Command::parse("PUT k v -250").unwrap();
        assert!(matches!(negative, Command::Put { ttl, .. } if ttl == Duration::ZERO));

        assert_eq!(
            Command::parse("PUT k v soon"),
            Err(ProtocolError::InvalidTtl("soon".to_string()))
        );
    }
}
