use anyhow::Result;
use jobscout::config::Config;
use jobscout::daemon::{CrawlHandler, HttpServer};
use jobscout::status::StatusStore;
use jobscout::storage::JobStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use super::{build_coordinator, open_store};

/// Serve the HTTP API until Ctrl+C
pub async fn serve(config: Config) -> Result<()> {
    let store = open_store(&config)?;
    let status = StatusStore::new();
    let (events, status_task) = status.subscribe();

    let coordinator = Arc::new(build_coordinator(&config, store.clone())?.with_events(events));
    let handler = Arc::new(CrawlHandler::new(
        coordinator.clone(),
        status,
        store.clone(),
        config.crawl.terms_file.clone(),
    ));

    let (shutdown_tx, shutdown_rx) = broadcast::channel(4);
    let http_server = HttpServer::new(config.http.clone(), handler);
    let http_handle = tokio::spawn(async move {
        match http_server.run(shutdown_rx).await {
            Ok(()) => info!("HTTP server shut down cleanly"),
            Err(e) => error!("HTTP server failed: {}", e),
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    coordinator.request_stop();
    let _ = shutdown_tx.send(());

    let http_abort = http_handle.abort_handle();
    if tokio::time::timeout(Duration::from_secs(5), http_handle).await.is_err() {
        warn!("HTTP server did not shut down within 5s, aborting");
        http_abort.abort();
    }
    status_task.abort();

    if let Err(e) = store.flush() {
        warn!("Failed to flush storage during shutdown: {}", e);
    }

    info!("Shutdown complete");
    Ok(())
}
