//! HTTP API Request/Response Types

use serde::{Deserialize, Serialize};

/// Custom-term crawl request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomCrawlRequest {
    pub term: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
}

/// Returned when a crawl is accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlStartedResponse {
    /// Number of query terms queued
    pub terms: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopResponse {
    /// Whether a running crawl was asked to stop
    pub stopping: bool,
}

/// Storage statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub jobs: usize,
    pub raw_html_total: usize,
    pub raw_html_processed: usize,
    pub raw_html_pending: usize,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }
}
