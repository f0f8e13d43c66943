use anyhow::{Context, Result};
use jobscout::config::Config;
use jobscout::export::write_jobs_csv;
use jobscout::storage::JobStore;
use std::io::BufWriter;
use std::path::PathBuf;

use super::open_store;

pub async fn export_jobs(config: Config, output: PathBuf) -> Result<()> {
    let store = open_store(&config)?;
    let jobs = store.all_jobs()?;

    let file = std::fs::File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let count = write_jobs_csv(&jobs, BufWriter::new(file))?;

    println!("Exported {} jobs to {}", count, output.display());
    Ok(())
}
