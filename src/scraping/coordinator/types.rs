//! Coordinator types: progress events, per-page results, and statistics

use serde::Serialize;
use thiserror::Error;

use crate::scraping::extractor::ExtractError;
use crate::scraping::fetcher::FetchError;
use crate::storage::SaveOutcome;
use crate::types::ExtractedFields;

/// Progress events emitted by the coordinator to its single status consumer.
///
/// Serialized as internally-tagged JSON (`"type": "variant_name"`).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CrawlEvent {
    RunStarted {
        total: usize,
    },
    /// `index` is 1-based
    TermStarted {
        index: usize,
        total: usize,
        term: String,
    },
    JobSaved {
        link: String,
        title: String,
    },
    PageFailed {
        url: String,
        reason: String,
    },
    TermFinished {
        index: usize,
        term: String,
        stats: CrawlStats,
    },
    RunFinished {
        stats: CrawlStats,
        stopped: bool,
    },
}

impl CrawlEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            CrawlEvent::RunStarted { .. } => "run_started",
            CrawlEvent::TermStarted { .. } => "term_started",
            CrawlEvent::JobSaved { .. } => "job_saved",
            CrawlEvent::PageFailed { .. } => "page_failed",
            CrawlEvent::TermFinished { .. } => "term_finished",
            CrawlEvent::RunFinished { .. } => "run_finished",
        }
    }
}

/// Why a job page produced no save attempt
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("Extraction aborted: {0}")]
    Extraction(#[from] ExtractError),
    #[error("Extraction task failed: {0}")]
    Task(String),
    #[error("Storage error: {0:#}")]
    Storage(anyhow::Error),
}

/// Result of running the pipeline over one job page
#[derive(Debug, Clone)]
pub struct PageReport {
    pub url: String,
    pub outcome: SaveOutcome,
    /// Cleaned fields handed to storage
    pub fields: ExtractedFields,
    /// Whether the enrichment adapter contributed
    pub enriched: bool,
}

/// Counters for a crawl, term, or reprocessing run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    /// Search-result pages fetched
    pub search_pages: u64,
    /// Job pages that reached storage
    pub job_pages: u64,
    pub saved: u64,
    pub duplicates: u64,
    pub missing_required: u64,
    /// Job pages without any title
    pub extraction_aborts: u64,
    /// Failed fetches and non-2xx job pages
    pub fetch_failures: u64,
    /// Links dropped by the denylist
    pub denied_links: u64,
    pub enriched: u64,
    /// Storage and task failures
    pub errors: u64,
}

impl CrawlStats {
    /// Count the result of one job page
    pub fn record(&mut self, result: &Result<PageReport, PageError>) {
        match result {
            Ok(report) => {
                self.job_pages += 1;
                if report.enriched {
                    self.enriched += 1;
                }
                match report.outcome {
                    SaveOutcome::Saved => self.saved += 1,
                    SaveOutcome::Duplicate => self.duplicates += 1,
                    SaveOutcome::MissingRequired => self.missing_required += 1,
                }
            }
            Err(PageError::Fetch(_) | PageError::Status(_)) => self.fetch_failures += 1,
            Err(PageError::Extraction(_)) => self.extraction_aborts += 1,
            Err(PageError::Task(_) | PageError::Storage(_)) => self.errors += 1,
        }
    }

    pub fn merge(&mut self, other: &CrawlStats) {
        self.search_pages += other.search_pages;
        self.job_pages += other.job_pages;
        self.saved += other.saved;
        self.duplicates += other.duplicates;
        self.missing_required += other.missing_required;
        self.extraction_aborts += other.extraction_aborts;
        self.fetch_failures += other.fetch_failures;
        self.denied_links += other.denied_links;
        self.enriched += other.enriched;
        self.errors += other.errors;
    }

    /// Pages that ended without a save attempt
    pub fn failures(&self) -> u64 {
        self.extraction_aborts + self.fetch_failures + self.errors
    }
}
