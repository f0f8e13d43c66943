//! Crawl and fetch configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::DEFAULT_USER_AGENT;

/// Crawl controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Domain configuration CSV
    pub domains_file: PathBuf,
    /// Predefined query terms CSV (`job_title` column)
    pub terms_file: PathBuf,
    /// Lower bound of the pause after each job-page fetch (milliseconds)
    pub job_delay_min_ms: u64,
    /// Upper bound of the pause after each job-page fetch (milliseconds)
    pub job_delay_max_ms: u64,
    /// Pause between query terms (milliseconds)
    pub term_delay_ms: u64,
    /// URL substrings that mark a link as not being a job posting
    pub link_denylist: Vec<String>,
    /// Minimum description length worth sending to the enrichment adapter
    pub min_description_chars: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            domains_file: PathBuf::from("domains.csv"),
            terms_file: PathBuf::from("terms.csv"),
            job_delay_min_ms: 1500,
            job_delay_max_ms: 3500,
            term_delay_ms: 2000,
            link_denylist: default_link_denylist(),
            min_description_chars: 50,
        }
    }
}

/// Login/registration pages, app-store links and employer marketing pages
pub fn default_link_denylist() -> Vec<String> {
    [
        "/login",
        "/logout",
        "/register",
        "/signup",
        "/sign-up",
        "/signin",
        "/sign-in",
        "apps.apple.com",
        "itunes.apple.com",
        "play.google.com",
        "/employer",
        "/recruiter",
        "/post-job",
        "/post-a-job",
        "/pricing",
        "/advertise",
        "javascript:",
        "mailto:",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Browser user agent sent with every request
    pub user_agent: String,
    /// Request timeout (seconds)
    pub timeout_secs: u64,
    /// Connection timeout (seconds)
    pub connect_timeout_secs: u64,
    /// Total attempts per request, first try included
    pub max_attempts: u32,
    /// First backoff delay; doubles on each retry (milliseconds)
    pub backoff_base_ms: u64,
    /// Status codes that trigger a retry
    pub retry_statuses: Vec<u16>,
    /// Lower bound of the randomized pre-request delay (milliseconds)
    pub delay_min_ms: u64,
    /// Upper bound of the randomized pre-request delay (milliseconds)
    pub delay_max_ms: u64,
    /// Maximum response size (bytes)
    pub max_content_size: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_attempts: 3,
            backoff_base_ms: 500,
            retry_statuses: vec![500, 502, 503, 504],
            delay_min_ms: 1000,
            delay_max_ms: 3000,
            max_content_size: 10 * 1024 * 1024, // 10 MB
        }
    }
}
