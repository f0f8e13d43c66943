use anyhow::Result;
use jobscout::config::{load_terms, Config};
use jobscout::scraping::CrawlCoordinator;
use jobscout::storage::JobStore;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use super::{build_coordinator, open_store, print_summary};

/// Stop the crawl cooperatively on Ctrl+C
fn stop_on_ctrl_c(coordinator: &Arc<CrawlCoordinator>) {
    let coordinator = Arc::clone(coordinator);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, stopping after the current page");
            coordinator.request_stop();
        }
    });
}

async fn run(config: Config, terms: Vec<String>) -> Result<()> {
    let store = open_store(&config)?;
    let coordinator = Arc::new(build_coordinator(&config, store.clone())?);
    stop_on_ctrl_c(&coordinator);

    let stats = coordinator.run_terms(&terms).await;
    store.flush()?;

    print_summary("Crawl Summary", &stats);
    Ok(())
}

/// Crawl every predefined term
pub async fn crawl_terms(config: Config) -> Result<()> {
    let terms = load_terms(&config.crawl.terms_file)?;
    info!(
        "Loaded {} terms from {}",
        terms.len(),
        config.crawl.terms_file.display()
    );
    run(config, terms).await
}

/// Crawl a single custom term
pub async fn search_term(config: Config, term: String) -> Result<()> {
    let term = term.trim().to_string();
    if term.is_empty() {
        anyhow::bail!("Search term must not be empty");
    }
    run(config, vec![term]).await
}
