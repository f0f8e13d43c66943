//! CLI command implementations

mod crawl;
mod export;
mod init;
mod reprocess;
mod serve;
mod stats;

pub use crawl::{crawl_terms, search_term};
pub use export::export_jobs;
pub use init::init_config;
pub use reprocess::reprocess_pages;
pub use serve::serve;
pub use stats::show_stats;

use anyhow::{Context, Result};
use jobscout::{
    config::{Config, DomainRegistry},
    enrichment::Enrichment,
    scraping::{CrawlCoordinator, CrawlStats, FetchConfig, HttpFetcher},
    storage::{JobStore, SledJobStore},
};
use std::sync::Arc;
use tracing::{info, warn};

/// Open the job database under the configured data directory
pub(crate) fn open_store(config: &Config) -> Result<Arc<SledJobStore>> {
    std::fs::create_dir_all(&config.storage.data_dir).with_context(|| {
        format!(
            "Failed to create data directory {}",
            config.storage.data_dir.display()
        )
    })?;
    Ok(Arc::new(SledJobStore::open(&config.storage.data_dir)?))
}

/// Build a coordinator from config. Domain loading errors are fatal here,
/// before any fetching starts.
pub(crate) fn build_coordinator(config: &Config, store: Arc<dyn JobStore>) -> Result<CrawlCoordinator> {
    let domains = DomainRegistry::load(&config.crawl.domains_file)?;
    info!(
        "Loaded {} domains from {}",
        domains.len(),
        config.crawl.domains_file.display()
    );

    let fetcher = HttpFetcher::new(FetchConfig::from(&config.fetch))
        .context("Failed to build HTTP fetcher")?;

    let enrichment = match Enrichment::from_config(&config.enrichment) {
        Ok(enrichment) => enrichment,
        Err(e) => {
            warn!("Enrichment disabled: {}", e);
            Enrichment::Unavailable
        }
    };
    if !enrichment.is_available() {
        info!("AI enrichment unavailable; extracting without it");
    }

    Ok(
        CrawlCoordinator::new(Arc::new(fetcher), store, domains, config.crawl.clone())
            .with_enrichment(enrichment),
    )
}

pub(crate) fn print_summary(title: &str, stats: &CrawlStats) {
    println!("\n{}", title);
    println!("{}", "=".repeat(title.len()));
    println!("Search pages fetched: {}", stats.search_pages);
    println!("Job pages processed:  {}", stats.job_pages);
    println!("Jobs saved:           {}", stats.saved);
    println!("Duplicates skipped:   {}", stats.duplicates);
    println!("Missing title/link:   {}", stats.missing_required);
    println!("Enriched:             {}", stats.enriched);
    println!("Denied links:         {}", stats.denied_links);
    println!("Failures:             {}", stats.failures());
}
