//! TCP Server Module
//!
//! Accept loop for the line protocol. Each client runs on its own task and
//! all clients share one [`StringCache`].

pub mod connection;

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::cache::ShardedCache;

pub use connection::{execute, handle_connection, process_line};

/// The cache type served over the wire.
pub type StringCache = ShardedCache<String, String>;

/// Accepts clients until `shutdown` resolves.
///
/// Connections already in flight keep running on their own tasks.
pub async fn serve<F>(listener: TcpListener, cache: Arc<StringCache>, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, addr) = match accepted {
                    Ok(conn) => conn,
                    Err(err) => {
                        warn!(%err, "failed to accept connection");
                        continue;
                    }
                };

                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    debug!(%addr, "client connected");
                    if let Err(err) = handle_connection(stream, cache).await {
                        debug!(%addr, %err, "connection closed with error");
                    }
                    debug!(%addr, "client disconnected");
                });
            }
            _ = &mut shutdown => {
                info!("Listener stopped");
                break;
            }
        }
    }
}
