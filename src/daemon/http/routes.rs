//! HTTP API Route Definitions

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, AppState};

/// Create the API router with all routes
pub fn create_router(app_state: AppState) -> Router {
    let api_v1 = Router::new()
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::status))
        .route("/stats", get(handlers::stats))
        // Crawl control
        .route("/crawl", post(handlers::start_crawl))
        .route("/crawl/custom", post(handlers::start_custom_crawl))
        .route("/crawl/stop", post(handlers::stop_crawl))
        .route("/export", get(handlers::export_jobs))
        .with_state(app_state);

    // Mount under /api/v1
    Router::new().nest("/api/v1", api_v1)
}
