//! Crawl request handler
//!
//! Owns the coordinator and status store for a long-running process. Crawls
//! run on a background task; at most one runs at a time.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;
use tracing::{error, info};

use crate::config::{load_terms, ConfigLoadError};
use crate::export::write_jobs_csv;
use crate::scraping::{CrawlCoordinator, CrawlEvent, CrawlStats};
use crate::status::{StatusSnapshot, StatusStore};
use crate::storage::{JobStore, RawHtmlStats};

/// Why a crawl could not be started
#[derive(Debug, Error)]
pub enum StartError {
    #[error("A crawl is already running")]
    AlreadyRunning,
    #[error("Search term must not be empty")]
    EmptyTerm,
    #[error(transparent)]
    Config(#[from] ConfigLoadError),
}

pub struct CrawlHandler {
    coordinator: Arc<CrawlCoordinator>,
    status: StatusStore,
    store: Arc<dyn JobStore>,
    terms_file: PathBuf,
}

impl CrawlHandler {
    /// `coordinator` must send its events to `status` (see [`StatusStore::subscribe`])
    pub fn new(
        coordinator: Arc<CrawlCoordinator>,
        status: StatusStore,
        store: Arc<dyn JobStore>,
        terms_file: PathBuf,
    ) -> Self {
        Self {
            coordinator,
            status,
            store,
            terms_file,
        }
    }

    /// Crawl the predefined terms. Returns the number of terms queued.
    pub fn start_predefined(&self) -> Result<usize, StartError> {
        if self.status.is_running() {
            return Err(StartError::AlreadyRunning);
        }
        let terms = load_terms(&self.terms_file)?;
        self.start(terms)
    }

    /// Crawl a single custom term
    pub fn start_custom(&self, term: &str) -> Result<usize, StartError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(StartError::EmptyTerm);
        }
        self.start(vec![term.to_string()])
    }

    fn start(&self, terms: Vec<String>) -> Result<usize, StartError> {
        let count = terms.len();
        if !self.status.try_begin(count) {
            return Err(StartError::AlreadyRunning);
        }
        info!("Starting background crawl of {} terms", count);

        // Cleared here so a stop sent before the task first runs still counts
        self.coordinator.reset_stop();
        let coordinator = Arc::clone(&self.coordinator);
        let status = self.status.clone();
        tokio::spawn(async move {
            let run = tokio::spawn(async move { coordinator.run_terms(&terms).await });
            if let Err(e) = run.await {
                error!("Crawl task failed: {}", e);
                status.apply(&CrawlEvent::RunFinished {
                    stats: CrawlStats::default(),
                    stopped: true,
                });
            }
        });
        Ok(count)
    }

    /// Request a cooperative stop. Returns false when nothing is running.
    pub fn stop(&self) -> bool {
        if !self.status.is_running() {
            return false;
        }
        info!("Stop requested");
        self.coordinator.request_stop();
        true
    }

    pub fn status(&self) -> StatusSnapshot {
        self.status.snapshot()
    }

    pub fn job_count(&self) -> usize {
        self.store.job_count()
    }

    pub fn raw_html_stats(&self) -> Result<RawHtmlStats> {
        self.store.raw_html_stats()
    }

    /// All job records as CSV bytes
    pub fn export_csv(&self) -> Result<Vec<u8>> {
        let jobs = self.store.all_jobs()?;
        let mut out = Vec::new();
        write_jobs_csv(&jobs, &mut out)?;
        Ok(out)
    }
}
