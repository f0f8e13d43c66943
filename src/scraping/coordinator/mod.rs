//! Crawl coordinator driving the extraction pipeline
//!
//! For each query term the coordinator walks every configured domain
//! sequentially: fetch a search-result page, collect job links, then fetch,
//! cache, extract, enrich, clean, and save each job page in turn. Requests
//! are never issued concurrently; the politeness delays assume a single
//! worker.
//!
//! Failures are contained at the loop level they occur in. A failed job page
//! is logged and skipped; a failed or empty search page ends that domain's
//! pagination. Only configuration errors, raised before a coordinator
//! exists, abort a run.

mod types;

pub use types::*;

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use super::cleaner::RecordCleaner;
use super::extractor::{FieldExtractor, PageExtraction};
use super::fetcher::PageFetcher;
use super::links::{extract_job_links, LinkFilter};
use super::normalizer::clean_html;
use super::politeness::RequestDelay;
use crate::config::{CrawlConfig, DomainConfig, DomainRegistry};
use crate::enrichment::Enrichment;
use crate::storage::{JobStore, SaveOutcome};

/// Crawl coordinator for query terms over the configured domains
pub struct CrawlCoordinator {
    fetcher: Arc<dyn PageFetcher>,
    /// Shared with `spawn_blocking` extraction tasks
    extractor: Arc<FieldExtractor>,
    cleaner: RecordCleaner,
    enrichment: Enrichment,
    store: Arc<dyn JobStore>,
    domains: DomainRegistry,
    config: CrawlConfig,
    link_filter: LinkFilter,
    job_delay: RequestDelay,
    term_delay: RequestDelay,
    events: Option<UnboundedSender<CrawlEvent>>,
    stop: AtomicBool,
}

impl CrawlCoordinator {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn JobStore>,
        domains: DomainRegistry,
        config: CrawlConfig,
    ) -> Self {
        let link_filter = LinkFilter::new(&config.link_denylist);
        let job_delay = RequestDelay::from_millis(config.job_delay_min_ms, config.job_delay_max_ms);
        let term_delay = RequestDelay::from_millis(config.term_delay_ms, config.term_delay_ms);

        Self {
            fetcher,
            extractor: Arc::new(FieldExtractor::default()),
            cleaner: RecordCleaner::new(),
            enrichment: Enrichment::Unavailable,
            store,
            domains,
            config,
            link_filter,
            job_delay,
            term_delay,
            events: None,
            stop: AtomicBool::new(false),
        }
    }

    pub fn with_enrichment(mut self, enrichment: Enrichment) -> Self {
        self.enrichment = enrichment;
        self
    }

    /// Send progress events to a status consumer
    pub fn with_events(mut self, events: UnboundedSender<CrawlEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Override the pauses between job pages and between terms
    pub fn with_delays(mut self, job_delay: RequestDelay, term_delay: RequestDelay) -> Self {
        self.job_delay = job_delay;
        self.term_delay = term_delay;
        self
    }

    pub fn domains(&self) -> &DomainRegistry {
        &self.domains
    }

    /// Ask a running crawl to stop at the next term or domain boundary
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Clear an earlier stop request. Call before launching a new run; a
    /// stop requested after this and before the run starts is honoured.
    pub fn reset_stop(&self) {
        self.stop.store(false, Ordering::Relaxed);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    fn emit(&self, event: CrawlEvent) {
        if let Some(tx) = &self.events {
            // The status consumer going away must not stop the crawl
            let _ = tx.send(event);
        }
    }

    /// Crawl every term in order, pausing between terms
    pub async fn run_terms(&self, terms: &[String]) -> CrawlStats {
        let total = terms.len();
        let mut stats = CrawlStats::default();
        let mut stopped = false;

        info!("Starting crawl: {} terms across {} domains", total, self.domains.len());
        self.emit(CrawlEvent::RunStarted { total });

        for (i, term) in terms.iter().enumerate() {
            if self.stop_requested() {
                stopped = true;
                break;
            }
            if i > 0 {
                self.term_delay.wait().await;
            }

            self.emit(CrawlEvent::TermStarted {
                index: i + 1,
                total,
                term: term.clone(),
            });
            let term_stats = self.search(term).await;
            stats.merge(&term_stats);
            self.emit(CrawlEvent::TermFinished {
                index: i + 1,
                term: term.clone(),
                stats: term_stats,
            });
        }
        stopped |= self.stop_requested();

        info!(
            saved = stats.saved,
            duplicates = stats.duplicates,
            failures = stats.failures(),
            stopped,
            "Crawl finished"
        );
        self.emit(CrawlEvent::RunFinished { stats, stopped });
        stats
    }

    /// Crawl one term over every configured domain
    pub async fn search(&self, term: &str) -> CrawlStats {
        let mut stats = CrawlStats::default();
        info!(term, "Searching {} domains", self.domains.len());

        for domain in self.domains.iter() {
            if self.stop_requested() {
                info!(term, "Stop requested, skipping remaining domains");
                break;
            }
            let domain_stats = self.search_domain(domain, term).await;
            stats.merge(&domain_stats);
        }
        stats
    }

    /// Walk the paginated results of one domain for one term.
    ///
    /// Pagination ends when a results page fails to fetch, returns a non-2xx
    /// status, or matches no job links. There is no page cap.
    pub async fn search_domain(&self, domain: &DomainConfig, term: &str) -> CrawlStats {
        let mut stats = CrawlStats::default();
        let mut page: u32 = 1;

        loop {
            let url = domain.page_url(term, page);
            debug!(domain = domain.key(), term, page, "Fetching search page {}", url);

            let response = match self.fetcher.fetch(&url).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(domain = domain.key(), term, page, "Search page {} failed: {}", url, e);
                    self.emit(CrawlEvent::PageFailed {
                        url,
                        reason: e.to_string(),
                    });
                    break;
                }
            };
            stats.search_pages += 1;

            if !response.is_success() {
                info!(
                    domain = domain.key(),
                    term,
                    page,
                    "Search page returned HTTP {}, ending pagination",
                    response.status_code
                );
                break;
            }

            let links = extract_job_links(
                &response.body,
                &domain.domain_link,
                &domain.job_link_selector,
                page == 1,
                &self.link_filter,
            );
            stats.denied_links += links.denied as u64;

            if links.matched == 0 {
                info!(domain = domain.key(), term, page, "No job links found, ending pagination");
                break;
            }
            if links.used_fallback {
                debug!(domain = domain.key(), "Job link selector matched nothing, used href fallback");
            }
            info!(
                domain = domain.key(),
                term,
                page,
                "Found {} job links ({} denied)",
                links.job_links.len(),
                links.denied
            );

            for link in &links.job_links {
                let result = self.process_job_url(link, domain).await;
                stats.record(&result);
                self.job_delay.wait().await;
            }

            if !domain.pagination || self.stop_requested() {
                break;
            }
            page += 1;
        }

        stats
    }

    /// Fetch, cache, and process one job page
    pub async fn process_job_url(&self, url: &str, domain: &DomainConfig) -> Result<PageReport, PageError> {
        let result = self.fetch_and_process(url, domain).await;
        self.report(url, &result);
        result
    }

    async fn fetch_and_process(&self, url: &str, domain: &DomainConfig) -> Result<PageReport, PageError> {
        let response = self.fetcher.fetch(url).await?;
        if !response.is_success() {
            return Err(PageError::Status(response.status_code));
        }

        if let Err(e) = self
            .store
            .upsert_raw_html(url, &response.body, Utc::now(), domain.key())
        {
            warn!(url, "Failed to cache raw HTML: {:#}", e);
        }

        let result = self.process_page(&response.body, url, Some(domain)).await;
        self.mark_processed(url, &result);
        result
    }

    /// Run extraction, enrichment, and cleaning over a job page, then save it.
    ///
    /// `url` is authoritative for the record's link.
    pub async fn process_page(
        &self,
        html: &str,
        url: &str,
        domain: Option<&DomainConfig>,
    ) -> Result<PageReport, PageError> {
        let extractor = Arc::clone(&self.extractor);
        let html = html.to_string();
        let domain_owned = domain.cloned();
        let extraction = tokio::task::spawn_blocking(move || {
            let cleaned = clean_html(&html);
            extractor.extract_all(&cleaned, domain_owned.as_ref())
        })
        .await
        .map_err(|e| PageError::Task(e.to_string()))?;

        let PageExtraction {
            mut fields,
            description,
        } = extraction?;

        let mut enriched = false;
        if self.enrichment.is_available()
            && description.chars().count() >= self.config.min_description_chars
        {
            match self.enrichment.enhance(&description).await {
                Ok(response) => {
                    response.apply(&mut fields);
                    enriched = true;
                }
                Err(e) => warn!(url, "Enrichment failed, continuing without it: {}", e),
            }
        }

        let mut fields = self.cleaner.clean(fields);
        fields.link = Some(url.to_string());

        let outcome = self.store.save_job(&fields).map_err(PageError::Storage)?;
        Ok(PageReport {
            url: url.to_string(),
            outcome,
            fields,
            enriched,
        })
    }

    /// Re-run the pipeline over cached pages whose processing never succeeded
    pub async fn reprocess(&self, domain_filter: Option<&str>, limit: usize) -> anyhow::Result<CrawlStats> {
        let records = self.store.query_unprocessed_raw_html(domain_filter, limit)?;
        info!("Reprocessing {} cached pages", records.len());

        let mut stats = CrawlStats::default();
        for record in records {
            if self.stop_requested() {
                break;
            }
            let domain = self
                .domains
                .get(&record.source_domain)
                .or_else(|| self.domains.for_url(&record.url));

            let result = self.process_page(&record.html_content, &record.url, domain).await;
            self.mark_processed(&record.url, &result);
            self.report(&record.url, &result);
            stats.record(&result);
        }
        Ok(stats)
    }

    fn mark_processed(&self, url: &str, result: &Result<PageReport, PageError>) {
        let success = matches!(
            result,
            Ok(PageReport {
                outcome: SaveOutcome::Saved | SaveOutcome::Duplicate,
                ..
            })
        );
        if let Err(e) = self.store.mark_processed(url, success, Utc::now()) {
            warn!(url, "Failed to mark page processed: {:#}", e);
        }
    }

    fn report(&self, url: &str, result: &Result<PageReport, PageError>) {
        match result {
            Ok(report) => match report.outcome {
                SaveOutcome::Saved => {
                    let title = report.fields.title.clone().unwrap_or_default();
                    info!(url, "Saved job: {}", title);
                    self.emit(CrawlEvent::JobSaved {
                        link: url.to_string(),
                        title,
                    });
                }
                SaveOutcome::Duplicate => debug!(url, "Job already stored"),
                SaveOutcome::MissingRequired => debug!(url, "Job missing required fields, not saved"),
            },
            Err(e) => {
                warn!(url, "Job page failed: {}", e);
                self.emit(CrawlEvent::PageFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraping::fetcher::{FetchError, FetchResult};
    use crate::storage::SledJobStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    struct MapFetcher {
        pages: HashMap<String, (u16, String)>,
    }

    #[async_trait]
    impl PageFetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
            let (status, body) = self
                .pages
                .get(url)
                .cloned()
                .unwrap_or((404, String::new()));
            Ok(FetchResult {
                final_url: url.to_string(),
                status_code: status,
                body,
                fetch_duration: Duration::ZERO,
                attempts: 1,
            })
        }
    }

    fn coordinator(pages: &[(&str, u16, &str)], store: Arc<SledJobStore>) -> CrawlCoordinator {
        let pages = pages
            .iter()
            .map(|(u, s, b)| (u.to_string(), (*s, b.to_string())))
            .collect();
        let domain = DomainConfig::new(
            "https://jobs.example.com",
            "https://jobs.example.com/search?q={searchTerm}",
            "a.job-link",
            false,
            "",
        )
        .unwrap();
        CrawlCoordinator::new(
            Arc::new(MapFetcher { pages }),
            store,
            DomainRegistry::new(vec![domain]),
            CrawlConfig::default(),
        )
        .with_delays(RequestDelay::none(), RequestDelay::none())
    }

    #[tokio::test]
    async fn process_page_sets_link_from_url() {
        let store = Arc::new(SledJobStore::temporary().unwrap());
        let crawler = coordinator(&[], store.clone());

        let html = "<html><body><h1>Job Title: Welder</h1></body></html>";
        let report = crawler
            .process_page(html, "https://jobs.example.com/jobs/7", None)
            .await
            .unwrap();

        assert_eq!(report.outcome, SaveOutcome::Saved);
        assert_eq!(report.fields.title.as_deref(), Some("Welder"));
        let stored = store.get_job("https://jobs.example.com/jobs/7").unwrap().unwrap();
        assert_eq!(stored.title, "Welder");
    }

    #[tokio::test]
    async fn page_without_title_is_aborted() {
        let store = Arc::new(SledJobStore::temporary().unwrap());
        let crawler = coordinator(&[], store.clone());

        let result = crawler
            .process_page("<p>nothing here</p>", "https://jobs.example.com/x", None)
            .await;
        assert!(matches!(result, Err(PageError::Extraction(_))));
        assert_eq!(store.job_count(), 0);
    }

    #[tokio::test]
    async fn job_fetch_caches_and_marks_raw_html() {
        let store = Arc::new(SledJobStore::temporary().unwrap());
        let crawler = coordinator(
            &[
                ("https://jobs.example.com/jobs/1", 200, "<h1>Cook</h1>"),
                ("https://jobs.example.com/jobs/2", 200, "<p>no title</p>"),
            ],
            store.clone(),
        );
        let domain = crawler.domains().iter().next().unwrap().clone();

        crawler
            .process_job_url("https://jobs.example.com/jobs/1", &domain)
            .await
            .unwrap();
        assert!(crawler
            .process_job_url("https://jobs.example.com/jobs/2", &domain)
            .await
            .is_err());

        let pending = store.query_unprocessed_raw_html(None, 10).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].url, "https://jobs.example.com/jobs/2");
        assert_eq!(store.raw_html_stats().unwrap().total, 2);
    }

    #[tokio::test]
    async fn non_success_job_page_is_not_cached() {
        let store = Arc::new(SledJobStore::temporary().unwrap());
        let crawler = coordinator(&[], store.clone());
        let domain = crawler.domains().iter().next().unwrap().clone();

        let result = crawler
            .process_job_url("https://jobs.example.com/missing", &domain)
            .await;
        assert!(matches!(result, Err(PageError::Status(404))));
        assert_eq!(store.raw_html_stats().unwrap().total, 0);
    }

    #[tokio::test]
    async fn stop_before_run_skips_terms() {
        let store = Arc::new(SledJobStore::temporary().unwrap());
        let crawler = coordinator(&[], store);

        crawler.request_stop();
        let stats = crawler.run_terms(&["rust".to_string()]).await;
        assert_eq!(stats, CrawlStats::default());
        assert!(crawler.stop_requested());

        crawler.reset_stop();
        assert!(!crawler.stop_requested());
    }

    /// Requests a stop on the coordinator from inside its first fetch
    #[derive(Default)]
    struct StoppingFetcher {
        crawler: std::sync::OnceLock<std::sync::Weak<CrawlCoordinator>>,
        requests: parking_lot::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PageFetcher for StoppingFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
            self.requests.lock().push(url.to_string());
            if let Some(crawler) = self.crawler.get().and_then(|w| w.upgrade()) {
                crawler.request_stop();
            }
            Ok(FetchResult {
                final_url: url.to_string(),
                status_code: 200,
                body: "<html><body><p>No results</p></body></html>".to_string(),
                fetch_duration: Duration::ZERO,
                attempts: 1,
            })
        }
    }

    #[tokio::test]
    async fn stop_skips_remaining_domains_and_terms() {
        let store = Arc::new(SledJobStore::temporary().unwrap());
        let fetcher = Arc::new(StoppingFetcher::default());
        let domains = ["https://a.example", "https://b.example"]
            .iter()
            .map(|base| {
                DomainConfig::new(base, &format!("{}/s?q={{searchTerm}}", base), "a.job", true, "")
                    .unwrap()
            })
            .collect();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let crawler = Arc::new(
            CrawlCoordinator::new(
                fetcher.clone(),
                store,
                DomainRegistry::new(domains),
                CrawlConfig::default(),
            )
            .with_delays(RequestDelay::none(), RequestDelay::none())
            .with_events(tx),
        );
        fetcher.crawler.set(Arc::downgrade(&crawler)).unwrap();

        let stats = crawler
            .run_terms(&["rust".to_string(), "nurse".to_string()])
            .await;

        assert_eq!(*fetcher.requests.lock(), vec!["https://a.example/s?q=rust".to_string()]);
        assert_eq!(stats.search_pages, 1);

        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            last = Some(event);
        }
        assert!(matches!(last, Some(CrawlEvent::RunFinished { stopped: true, .. })));
    }
}
