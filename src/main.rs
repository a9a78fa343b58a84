//! NanoCache - A sharded in-memory cache server
//!
//! Listens for line protocol clients and serves them from one shared cache.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nanocache::{serve, spawn_cleanup_task, Config, StringCache};

/// Main entry point for the NanoCache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from the environment and arguments
/// 3. Create the sharded cache
/// 4. Start the background TTL cleanup task, if enabled
/// 5. Accept clients until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nanocache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting NanoCache v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load();
    info!(
        "Configuration loaded: port={}, capacity={} items, concurrency={}, cleanup_interval={}s",
        config.port, config.capacity, config.concurrency, config.cleanup_interval
    );

    let cache = Arc::new(
        StringCache::new(config.capacity, config.concurrency)
            .context("failed to build cache")?,
    );
    info!(
        "Cache initialized: {} shards x {} items",
        cache.shard_count(),
        cache.shard_capacity()
    );

    let cleanup_handle = (config.cleanup_interval > 0)
        .then(|| spawn_cleanup_task(Arc::clone(&cache), config.cleanup_interval));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    serve(listener, cache, shutdown_signal(cleanup_handle)).await;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task if one is running.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(%err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(%err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
