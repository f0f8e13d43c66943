use anyhow::Result;
use jobscout::config::Config;
use jobscout::storage::JobStore;
use tracing::info;

use super::{build_coordinator, open_store, print_summary};

/// Re-run extraction over cached pages that have not been processed yet
pub async fn reprocess_pages(config: Config, domain: Option<String>, limit: usize) -> Result<()> {
    let store = open_store(&config)?;
    let coordinator = build_coordinator(&config, store.clone())?;

    info!(
        "Reprocessing up to {} cached pages{}",
        limit,
        domain
            .as_deref()
            .map(|d| format!(" matching '{}'", d))
            .unwrap_or_default()
    );

    let stats = coordinator.reprocess(domain.as_deref(), limit).await?;
    store.flush()?;

    print_summary("Reprocess Summary", &stats);
    Ok(())
}
