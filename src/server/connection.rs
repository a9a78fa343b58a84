//! Connection Handler
//!
//! Reads request lines from one client and writes one reply line each.
//!
//! Cache calls are synchronous and finish before the next `.await`, so no
//! shard lock is ever held across I/O.

use std::io;
use std::sync::Arc;

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tracing::{debug, warn};

use crate::error::ProtocolError;
use crate::protocol::{Command, Reply};
use crate::server::StringCache;

/// Longest request line accepted, newline included.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Serves requests until the client closes its side.
///
/// Malformed requests get an `ERROR: ...` reply and the connection stays
/// open. Bytes that are not UTF-8 are replaced with U+FFFD, and a line
/// longer than [`MAX_LINE_LEN`] is discarded with an error reply. I/O
/// errors end the connection.
pub async fn handle_connection<S>(stream: S, cache: Arc<StringCache>) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = (&mut reader)
            .take(MAX_LINE_LEN as u64)
            .read_until(b'\n', &mut buf)
            .await?;
        if read == 0 {
            break;
        }

        let reply = if buf.len() == MAX_LINE_LEN && buf.last() != Some(&b'\n') {
            skip_line(&mut reader).await?;
            warn!(limit = MAX_LINE_LEN, "discarded oversized request line");
            Reply::from(ProtocolError::LineTooLong)
        } else {
            process_line(&cache, &decode_line(&buf))
        };
        writer.write_all(format!("{}\n", reply).as_bytes()).await?;
    }

    writer.flush().await
}

/// Strips the line terminator and decodes lossily.
fn decode_line(raw: &[u8]) -> String {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

/// Consumes input up to and including the next newline, or to EOF.
async fn skip_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (consumed, found) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(());
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (available.len(), false),
            }
        };
        reader.consume(consumed);
        if found {
            return Ok(());
        }
    }
}

/// Parses and executes one request line.
pub fn process_line(cache: &StringCache, line: &str) -> Reply {
    match Command::parse(line) {
        Ok(command) => execute(cache, command),
        Err(err) => {
            debug!(%err, "rejected request");
            err.into()
        }
    }
}

/// Applies a parsed command to the cache.
pub fn execute(cache: &StringCache, command: Command) -> Reply {
    match command {
        Command::Put { key, value, ttl } => {
            cache.put(key, value, ttl);
            Reply::Ok
        }
        Command::Get { key } => cache.get(&key).into(),
        Command::Remove { key } => {
            cache.remove(&key);
            Reply::Ok
        }
        Command::Size => Reply::Integer(cache.size()),
        Command::Stats => Reply::Stats(cache.stats()),
        Command::Ping => Reply::Pong,
    }
}
