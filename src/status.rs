//! Crawl progress for status queries
//!
//! The coordinator is the only writer: it sends [`CrawlEvent`]s over a channel
//! and a single consumer task folds them into a [`StatusSnapshot`]. Readers
//! take cheap clones of the snapshot.

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::scraping::{CrawlEvent, CrawlStats};

/// Progress of the current (or last) crawl run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub running: bool,
    /// Terms completed
    pub progress: usize,
    pub total: usize,
    pub current_term: Option<String>,
    pub percentage: f64,
    pub jobs_saved: u64,
    pub pages_failed: u64,
    /// Totals of the last finished run
    pub last_run: Option<CrawlStats>,
}

impl StatusSnapshot {
    fn update_percentage(&mut self) {
        self.percentage = if self.total == 0 {
            0.0
        } else {
            (self.progress as f64 / self.total as f64 * 100.0).min(100.0)
        };
    }

    /// Fold one event into the snapshot
    pub fn apply(&mut self, event: &CrawlEvent) {
        match event {
            CrawlEvent::RunStarted { total } => {
                *self = StatusSnapshot {
                    running: true,
                    total: *total,
                    last_run: self.last_run,
                    ..StatusSnapshot::default()
                };
            }
            CrawlEvent::TermStarted { index, total, term } => {
                self.running = true;
                self.total = *total;
                self.progress = index.saturating_sub(1);
                self.current_term = Some(term.clone());
            }
            CrawlEvent::JobSaved { .. } => self.jobs_saved += 1,
            CrawlEvent::PageFailed { .. } => self.pages_failed += 1,
            CrawlEvent::TermFinished { index, .. } => self.progress = *index,
            CrawlEvent::RunFinished { stats, stopped } => {
                self.running = false;
                self.current_term = None;
                if !stopped {
                    self.progress = self.total;
                }
                self.last_run = Some(*stats);
            }
        }
        self.update_percentage();
    }
}

/// Shared, read-mostly crawl status
#[derive(Debug, Clone, Default)]
pub struct StatusStore {
    inner: Arc<RwLock<StatusSnapshot>>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.inner.read().clone()
    }

    pub fn is_running(&self) -> bool {
        self.inner.read().running
    }

    /// Claim the running flag. Returns false if a run is already in progress.
    pub fn try_begin(&self, total: usize) -> bool {
        let mut status = self.inner.write();
        if status.running {
            return false;
        }
        status.apply(&CrawlEvent::RunStarted { total });
        true
    }

    pub fn apply(&self, event: &CrawlEvent) {
        self.inner.write().apply(event);
    }

    /// Create the event channel and spawn its consumer task
    pub fn subscribe(&self) -> (UnboundedSender<CrawlEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(self.clone().consume(rx));
        (tx, handle)
    }

    async fn consume(self, mut rx: UnboundedReceiver<CrawlEvent>) {
        while let Some(event) = rx.recv().await {
            tracing::trace!(event = event.event_name(), "Status event");
            self.apply(&event);
        }
    }
}
