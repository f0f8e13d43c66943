//! jobscout: crawl job boards and extract structured job records

use anyhow::Result;
use clap::{Parser, Subcommand};
use jobscout::config::Config;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "jobscout")]
#[command(about = "Crawl job boards and extract structured job records")]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to ./jobscout.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter configuration, domain list and term list
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Crawl every predefined term across all configured domains
    Crawl,

    /// Crawl a single custom term
    Search {
        /// Query term
        term: String,
    },

    /// Re-run extraction over cached pages that were not processed
    Reprocess {
        /// Only pages whose source domain contains this text
        #[arg(short, long)]
        domain: Option<String>,

        /// Maximum pages to reprocess
        #[arg(short, long, default_value = "100")]
        limit: usize,
    },

    /// Export stored jobs to CSV
    Export {
        /// Output path
        output: PathBuf,
    },

    /// Serve the HTTP control API
    Serve,

    /// Show storage statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { path } = cli.command {
        return commands::init_config(path).await;
    }

    let config = Config::load_or_default(cli.config.as_deref())?;
    config.logging.init(cli.verbose)?;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Crawl => commands::crawl_terms(config).await,
        Commands::Search { term } => commands::search_term(config, term).await,
        Commands::Reprocess { domain, limit } => {
            commands::reprocess_pages(config, domain, limit).await
        }
        Commands::Export { output } => commands::export_jobs(config, output).await,
        Commands::Serve => commands::serve(config).await,
        Commands::Stats => commands::show_stats(config).await,
    }
}
