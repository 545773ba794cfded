//! QuoteBoard binary.
//!
//! # Usage
//!
//! ```bash
//! cargo run
//! ```
//!
//! Configuration is environment-driven; see [`quoteboard::config`] for the
//! full variable table. `.env` files are honored.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use quoteboard::config::{AppConfig, RefreshMode};
use quoteboard::scheduler::RefreshScheduler;
use quoteboard::server::{AppState, create_router};
use quoteboard::telemetry::init_tracing;
use quoteboard::universe::SymbolRegistry;
use quoteboard::upstream::client::UpstreamClient;
use quoteboard::SnapshotCache;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    tracing::info!("Starting QuoteBoard");

    let config = AppConfig::from_env();
    log_config(&config);

    let registry = SymbolRegistry;
    let universe = registry.universe(&config.display_ids);

    let client = UpstreamClient::new(&config.upstream).context("building upstream client")?;
    let scheduler = Arc::new(RefreshScheduler::new(
        client,
        universe,
        config.scheduler.clone(),
    ));
    let cache = Arc::new(SnapshotCache::new(config.ttl));

    let shutdown = CancellationToken::new();

    // In eager mode a background loop keeps the cache warm; the first tick
    // fires immediately so the dashboard populates at startup.
    let eager_handle = if config.mode == RefreshMode::Eager {
        let handle = tokio::spawn(Arc::clone(&scheduler).run_eager_loop(
            Arc::clone(&cache),
            config.ttl,
            shutdown.clone(),
        ));
        Some(handle)
    } else {
        None
    };

    let state = AppState {
        cache,
        scheduler,
        mode: config.mode,
        ttl_secs: config.ttl.as_secs(),
    };
    let router = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "HTTP server listening");

    let server_shutdown = shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            server_shutdown.cancel();
        })
        .await
        .context("HTTP server error")?;

    // An in-flight refresh cycle is abandoned here; it never publishes.
    if let Some(handle) = eager_handle {
        let _ = handle.await;
    }

    tracing::info!("QuoteBoard stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &AppConfig) {
    tracing::info!(
        mode = ?config.mode,
        ttl_secs = config.ttl.as_secs(),
        http_port = config.http_port,
        universe = config.display_ids.len(),
        retry_attempts = config.upstream.retry.max_attempts,
        concurrency = config.scheduler.concurrency,
        "Configuration loaded"
    );
}

/// Resolve on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut signal) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            signal.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
