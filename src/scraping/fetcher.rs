//! HTTP fetcher for search-result and job pages
//!
//! Every request is preceded by a randomized politeness delay and retried
//! with exponential backoff on server errors and transport failures. A
//! non-2xx status that survives the retries is returned as a normal
//! [`FetchResult`]; callers decide whether it ends the page or the domain.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use super::politeness::RequestDelay;
use super::retry::RetryPolicy;
use crate::config::FetchSettings;

/// Errors that can occur during fetching
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Content too large: {0} bytes")]
    ContentTooLarge(usize),
    #[error("Failed to parse URL: {0}")]
    InvalidUrl(String),
}

/// Result of a completed request
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The fetched URL (may differ from request due to redirects)
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Response body
    pub body: String,
    /// Time taken, retries and backoff included
    pub fetch_duration: Duration,
    /// Attempts made, first try included
    pub attempts: u32,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Fetch a page: `url -> (status, body) | FetchError`
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError>;
}

/// Configuration for the HTTP fetcher
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string
    pub user_agent: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Maximum response size (bytes)
    pub max_content_size: usize,
    /// Retry behavior
    pub retry: RetryPolicy,
    /// Pause before every request
    pub delay: RequestDelay,
}

impl From<&FetchSettings> for FetchConfig {
    fn from(settings: &FetchSettings) -> Self {
        Self {
            user_agent: settings.user_agent.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            connect_timeout: Duration::from_secs(settings.connect_timeout_secs),
            max_content_size: settings.max_content_size,
            retry: RetryPolicy::from_settings(settings),
            delay: RequestDelay::from_millis(settings.delay_min_ms, settings.delay_max_ms),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&FetchSettings::default())
    }
}

/// Browser-like headers sent with every request
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}

/// reqwest-backed [`PageFetcher`]
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .default_headers(browser_headers())
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    async fn fetch_once(&self, url: &str) -> Result<(u16, String, String), FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        if let Some(len) = response.content_length() {
            if len as usize > self.config.max_content_size {
                return Err(FetchError::ContentTooLarge(len as usize));
            }
        }

        let body = response.text().await?;
        if body.len() > self.config.max_content_size {
            return Err(FetchError::ContentTooLarge(body.len()));
        }

        Ok((status, final_url, body))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;

        self.config.delay.wait().await;

        let start = Instant::now();
        let policy = &self.config.retry;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.fetch_once(url).await {
                Ok((status, final_url, body)) => {
                    if policy.is_retryable_status(status) && policy.can_retry(attempt) {
                        let backoff = policy.backoff(attempt);
                        debug!(url, status, attempt, ?backoff, "Retrying after server error");
                        tokio::time::sleep(backoff).await;
                        continue;
                    }
                    return Ok(FetchResult {
                        final_url,
                        status_code: status,
                        body,
                        fetch_duration: start.elapsed(),
                        attempts: attempt,
                    });
                }
                Err(FetchError::Http(e)) if policy.is_retryable_error(&e) && policy.can_retry(attempt) => {
                    let backoff = policy.backoff(attempt);
                    warn!(url, attempt, ?backoff, "Request failed, retrying: {}", e);
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{StatusCode, Uri};
    use axum::Router;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn config_follows_settings() {
        let mut settings = FetchSettings::default();
        settings.timeout_secs = 12;
        settings.max_attempts = 5;
        let config = FetchConfig::from(&settings);
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay, Duration::from_millis(500));
    }

    #[test]
    fn success_is_2xx_only() {
        let mut result = FetchResult {
            final_url: "https://example.com".to_string(),
            status_code: 200,
            body: String::new(),
            fetch_duration: Duration::ZERO,
            attempts: 1,
        };
        assert!(result.is_success());
        result.status_code = 404;
        assert!(!result.is_success());
        result.status_code = 503;
        assert!(!result.is_success());
    }

    #[test]
    fn browser_headers_are_present() {
        let headers = browser_headers();
        assert!(headers.contains_key(ACCEPT));
        assert!(headers.contains_key(ACCEPT_LANGUAGE));
    }

    type Hits = Arc<Mutex<HashMap<String, u32>>>;

    /// Counts hits per path: `/unavailable` answers 503, `/missing` 404,
    /// anything else 200
    async fn respond(State(hits): State<Hits>, uri: Uri) -> (StatusCode, &'static str) {
        *hits.lock().entry(uri.path().to_string()).or_insert(0) += 1;
        match uri.path() {
            "/unavailable" => (StatusCode::SERVICE_UNAVAILABLE, "busy"),
            "/missing" => (StatusCode::NOT_FOUND, "gone"),
            _ => (StatusCode::OK, "<h1>Welder</h1>"),
        }
    }

    async fn test_server() -> (SocketAddr, Hits) {
        let hits = Hits::default();
        let app = Router::new().fallback(respond).with_state(hits.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, hits)
    }

    fn fast_fetcher(max_attempts: u32) -> HttpFetcher {
        let config = FetchConfig {
            retry: RetryPolicy {
                max_attempts,
                base_delay: Duration::from_millis(1),
                ..RetryPolicy::default()
            },
            delay: RequestDelay::none(),
            ..FetchConfig::default()
        };
        HttpFetcher::new(config).unwrap()
    }

    fn hits_for(hits: &Hits, path: &str) -> u32 {
        hits.lock().get(path).copied().unwrap_or(0)
    }

    #[tokio::test]
    async fn server_error_is_retried_until_attempts_run_out() {
        let (addr, hits) = test_server().await;
        let fetcher = fast_fetcher(3);

        let result = fetcher
            .fetch(&format!("http://{}/unavailable", addr))
            .await
            .unwrap();

        assert_eq!(result.status_code, 503);
        assert_eq!(result.attempts, 3);
        assert_eq!(hits_for(&hits, "/unavailable"), 3);
    }

    #[tokio::test]
    async fn client_error_gets_one_attempt() {
        let (addr, hits) = test_server().await;
        let fetcher = fast_fetcher(3);

        let result = fetcher.fetch(&format!("http://{}/missing", addr)).await.unwrap();

        assert_eq!(result.status_code, 404);
        assert_eq!(result.attempts, 1);
        assert_eq!(hits_for(&hits, "/missing"), 1);
    }

    #[tokio::test]
    async fn success_returns_body() {
        let (addr, hits) = test_server().await;
        let fetcher = fast_fetcher(3);

        let result = fetcher.fetch(&format!("http://{}/jobs/1", addr)).await.unwrap();

        assert!(result.is_success());
        assert_eq!(result.body, "<h1>Welder</h1>");
        assert_eq!(result.attempts, 1);
        assert_eq!(hits_for(&hits, "/jobs/1"), 1);
    }

    #[tokio::test]
    async fn transport_error_is_retried() {
        // The first connection is closed without a response
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicU32::new(0));
        let counter = accepted.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    drop(socket);
                    continue;
                }
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok")
                    .await;
            }
        });

        let result = fast_fetcher(3)
            .fetch(&format!("http://{}/", addr))
            .await
            .unwrap();

        assert_eq!(result.status_code, 200);
        assert_eq!(result.body, "ok");
        assert_eq!(result.attempts, 2);
        assert_eq!(accepted.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn transport_error_after_last_attempt_is_returned() {
        // Bind then drop to get a port nothing listens on
        let addr = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap()
            .local_addr()
            .unwrap();

        let err = fast_fetcher(2)
            .fetch(&format!("http://{}/", addr))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
    }

    #[tokio::test]
    async fn rejects_invalid_url() {
        let mut config = FetchConfig::default();
        config.delay = RequestDelay::none();
        let fetcher = HttpFetcher::new(config).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
