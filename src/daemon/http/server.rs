//! Crawl control API server
//!
//! Serves the `/api/v1` router over one listener until the shared shutdown
//! broadcast fires. CORS is opt-in for browser dashboards.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::Method;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::HttpConfig;
use crate::daemon::handler::CrawlHandler;

use super::handlers::AppState;
use super::routes::create_router;

pub struct HttpServer {
    config: HttpConfig,
    handler: Arc<CrawlHandler>,
}

impl HttpServer {
    pub fn new(config: HttpConfig, handler: Arc<CrawlHandler>) -> Self {
        Self { config, handler }
    }

    /// Router with the crawl API plus CORS and request tracing layers
    pub fn app(&self) -> Router {
        let app = create_router(AppState {
            handler: self.handler.clone(),
        });

        let app = if self.config.cors_enabled {
            // Crawl control is GET/POST only
            app.layer(
                CorsLayer::new()
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers(Any)
                    .allow_origin(Any),
            )
        } else {
            app
        };

        app.layer(TraceLayer::new_for_http())
    }

    /// Bind `listen_addr` and serve until `shutdown` fires
    pub async fn run(&self, shutdown: broadcast::Receiver<()>) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .listen_addr
            .parse()
            .with_context(|| format!("Invalid HTTP listen address '{}'", self.config.listen_addr))?;

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind HTTP server to {}", addr))?;

        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` fires
    pub async fn serve(&self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        let local = listener.local_addr().context("HTTP listener has no address")?;
        info!("Crawl API listening on http://{}/api/v1", local);

        axum::serve(listener, self.app())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                info!("Crawl API shutting down");
            })
            .await
            .context("HTTP server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlConfig, DomainRegistry};
    use crate::scraping::{CrawlCoordinator, FetchError, FetchResult, PageFetcher};
    use crate::status::StatusStore;
    use crate::storage::{JobStore, SledJobStore};
    use std::path::PathBuf;
    use std::time::Duration;

    struct Offline;

    #[async_trait::async_trait]
    impl PageFetcher for Offline {
        async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
            Err(FetchError::InvalidUrl(url.to_string()))
        }
    }

    fn server(config: HttpConfig) -> HttpServer {
        let store: Arc<dyn JobStore> = Arc::new(SledJobStore::temporary().unwrap());
        let coordinator = CrawlCoordinator::new(
            Arc::new(Offline),
            store.clone(),
            DomainRegistry::default(),
            CrawlConfig::default(),
        );
        let handler = CrawlHandler::new(
            Arc::new(coordinator),
            StatusStore::new(),
            store,
            PathBuf::from("terms.csv"),
        );
        HttpServer::new(config, Arc::new(handler))
    }

    #[tokio::test]
    async fn rejects_bad_listen_addr() {
        let config = HttpConfig {
            listen_addr: "not-an-address".to_string(),
            ..HttpConfig::default()
        };
        let (_tx, rx) = broadcast::channel(1);
        let err = server(config).run(rx).await.unwrap_err();
        assert!(err.to_string().contains("Invalid HTTP listen address"));
    }

    #[tokio::test]
    async fn serves_health_and_stops_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = broadcast::channel(1);
        let server = server(HttpConfig::default());
        let task = tokio::spawn(async move { server.serve(listener, rx).await });

        let body: serde_json::Value = reqwest::get(format!("http://{}/api/v1/health", addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["healthy"], true);

        tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("server stopped")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn cors_headers_only_when_enabled() {
        for enabled in [false, true] {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let (tx, rx) = broadcast::channel(1);
            let server = server(HttpConfig {
                cors_enabled: enabled,
                ..HttpConfig::default()
            });
            let task = tokio::spawn(async move { server.serve(listener, rx).await });

            let response = reqwest::Client::new()
                .get(format!("http://{}/api/v1/status", addr))
                .header("Origin", "http://dashboard.local")
                .send()
                .await
                .unwrap();
            let has_cors = response.headers().contains_key("access-control-allow-origin");
            drop(response);
            assert_eq!(has_cors, enabled);

            tx.send(()).unwrap();
            let _ = task.await;
        }
    }
}
