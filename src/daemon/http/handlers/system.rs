//! System handlers: health, status, stats

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use super::AppState;
use crate::daemon::http::types::*;

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Crawl progress: `{running, progress, total, currentTerm, percentage}`
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.handler.status())
}

/// Stored job and raw-HTML counts
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    match state.handler.raw_html_stats() {
        Ok(raw) => (
            StatusCode::OK,
            Json(StatsResponse {
                jobs: state.handler.job_count(),
                raw_html_total: raw.total,
                raw_html_processed: raw.succeeded,
                raw_html_pending: raw.pending,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal_error(format!("{:#}", e))),
        )
            .into_response(),
    }
}
