//! HTTP API Request Handlers
//!
//! Handlers that map HTTP requests to [`CrawlHandler`] operations.

mod crawl;
mod system;

use std::sync::Arc;

use crate::daemon::handler::CrawlHandler;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<CrawlHandler>,
}

pub use crawl::{export_jobs, start_crawl, start_custom_crawl, stop_crawl};
pub use system::{health, stats, status};

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::Json;

    use crate::config::{CrawlConfig, DomainRegistry};
    use crate::daemon::http::types::CustomCrawlRequest;
    use crate::scraping::{CrawlCoordinator, FetchError, FetchResult, PageFetcher};
    use crate::status::StatusStore;
    use crate::storage::{JobStore, SledJobStore};

    struct NeverFetch;

    #[async_trait::async_trait]
    impl PageFetcher for NeverFetch {
        async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
            Err(FetchError::InvalidUrl(url.to_string()))
        }
    }

    fn state(terms_file: &std::path::Path) -> (AppState, StatusStore) {
        let store: Arc<dyn JobStore> = Arc::new(SledJobStore::temporary().unwrap());
        let status = StatusStore::new();
        let coordinator = CrawlCoordinator::new(
            Arc::new(NeverFetch),
            store.clone(),
            DomainRegistry::default(),
            CrawlConfig::default(),
        );
        let handler = CrawlHandler::new(
            Arc::new(coordinator),
            status.clone(),
            store,
            terms_file.to_path_buf(),
        );
        (
            AppState {
                handler: Arc::new(handler),
            },
            status,
        )
    }

    #[tokio::test]
    async fn second_crawl_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let (state, status) = state(&dir.path().join("terms.csv"));

        // Hold the running flag so the background run cannot finish first
        assert!(status.try_begin(1));
        let response = start_custom_crawl(
            State(state.clone()),
            Json(CustomCrawlRequest {
                term: "nurse".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn empty_custom_term_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = state(&dir.path().join("terms.csv"));
        let response = start_custom_crawl(
            State(state),
            Json(CustomCrawlRequest {
                term: "  ".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_terms_file_is_a_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let (state, status) = state(&dir.path().join("missing.csv"));
        let response = start_crawl(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!status.is_running());
    }

    #[tokio::test]
    async fn custom_crawl_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = state(&dir.path().join("terms.csv"));
        let response = start_custom_crawl(
            State(state),
            Json(CustomCrawlRequest {
                term: "driver".to_string(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn export_returns_csv() {
        let dir = tempfile::tempdir().unwrap();
        let (state, _) = state(&dir.path().join("terms.csv"));
        let response = export_jobs(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
    }
}
