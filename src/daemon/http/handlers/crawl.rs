//! Crawl handlers: start, stop, export

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error};

use super::AppState;
use crate::daemon::handler::StartError;
use crate::daemon::http::types::*;

fn start_response(result: Result<usize, StartError>) -> Response {
    match result {
        Ok(terms) => (
            StatusCode::ACCEPTED,
            Json(CrawlStartedResponse {
                terms,
                message: "Crawl started".to_string(),
            }),
        )
            .into_response(),
        Err(StartError::AlreadyRunning) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::conflict("A crawl is already running")),
        )
            .into_response(),
        Err(StartError::EmptyTerm) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Search term must not be empty")),
        )
            .into_response(),
        Err(StartError::Config(e)) => {
            error!("Crawl start failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("CONFIG_ERROR", e.to_string())),
            )
                .into_response()
        }
    }
}

/// Start a crawl over the predefined terms
pub async fn start_crawl(State(state): State<AppState>) -> impl IntoResponse {
    debug!("HTTP crawl request (predefined terms)");
    start_response(state.handler.start_predefined())
}

/// Start a crawl for one custom term
pub async fn start_custom_crawl(
    State(state): State<AppState>,
    Json(request): Json<CustomCrawlRequest>,
) -> impl IntoResponse {
    debug!("HTTP crawl request: term={}", request.term);
    start_response(state.handler.start_custom(&request.term))
}

/// Ask the running crawl to stop
pub async fn stop_crawl(State(state): State<AppState>) -> impl IntoResponse {
    Json(StopResponse {
        stopping: state.handler.stop(),
    })
}

/// Download all job records as CSV
pub async fn export_jobs(State(state): State<AppState>) -> impl IntoResponse {
    let handler = state.handler.clone();
    match tokio::task::spawn_blocking(move || handler.export_csv()).await {
        Ok(Ok(body)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"jobs.csv\""),
            ],
            body,
        )
            .into_response(),
        Ok(Err(e)) => {
            error!("Export failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error(format!("Export failed: {}", e))),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal_error(format!("Export task failed: {}", e))),
        )
            .into_response(),
    }
}
