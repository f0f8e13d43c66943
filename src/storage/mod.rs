//! Job record and raw-HTML persistence
//!
//! The pipeline only needs two contracts from storage: save-if-not-duplicate
//! for job records, and a raw-HTML cache that can be replayed later.

mod sled_store;

pub use sled_store::SledJobStore;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{ExtractedFields, JobRecord, RawHtmlRecord};

/// Result of [`JobStore::save_job`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    /// A new record was created
    Saved,
    /// A record with the same link already exists; nothing was written
    Duplicate,
    /// Title or link missing; nothing was written
    MissingRequired,
}

/// Raw-HTML cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RawHtmlStats {
    pub total: usize,
    pub succeeded: usize,
    pub pending: usize,
}

/// Storage gateway used by the crawl pipeline
pub trait JobStore: Send + Sync {
    /// Persist a job unless the title or link is missing or the link is taken
    fn save_job(&self, fields: &ExtractedFields) -> Result<SaveOutcome>;

    /// Insert or refresh a cached page. Processing state survives a refresh.
    fn upsert_raw_html(
        &self,
        url: &str,
        html: &str,
        fetched_at: DateTime<Utc>,
        source_domain: &str,
    ) -> Result<RawHtmlRecord>;

    /// Record the outcome of processing a cached page. Returns false when
    /// the URL is not cached.
    fn mark_processed(&self, url: &str, success: bool, processed_at: DateTime<Utc>) -> Result<bool>;

    /// Cached pages whose processing has not succeeded, newest first.
    /// `domain_filter` matches as a substring of the source domain.
    fn query_unprocessed_raw_html(&self, domain_filter: Option<&str>, limit: usize) -> Result<Vec<RawHtmlRecord>>;

    fn get_job(&self, link: &str) -> Result<Option<JobRecord>>;

    /// Every stored job, oldest first
    fn all_jobs(&self) -> Result<Vec<JobRecord>>;

    fn job_count(&self) -> usize;

    fn raw_html_stats(&self) -> Result<RawHtmlStats>;

    fn flush(&self) -> Result<()>;
}
