use anyhow::Result;
use jobscout::config::Config;
use jobscout::storage::JobStore;

use super::open_store;

pub async fn show_stats(config: Config) -> Result<()> {
    let store = open_store(&config)?;
    let raw = store.raw_html_stats()?;

    println!("jobscout Statistics");
    println!("===================");
    println!("Data directory:      {}", config.storage.data_dir.display());
    println!("Jobs stored:         {}", store.job_count());
    println!("Cached pages:        {}", raw.total);
    println!("  processed:         {}", raw.succeeded);
    println!("  pending:           {}", raw.pending);

    Ok(())
}
