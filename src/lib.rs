//! jobscout: job-portal crawler and structured job extraction
//!
//! Crawls job-board search results for a set of query terms, follows job
//! links, and turns heterogeneous job-posting HTML into canonical job records:
//! - Polite HTTP fetching with retry/backoff and randomized delays
//! - Noise stripping of navigation, script and style markup
//! - An ordered cascade of extraction strategies (tables, selectors, title
//!   tag, keyword patterns, job-type vocabulary)
//! - Optional AI enrichment through an OpenAI-compatible endpoint
//! - Idempotent record cleaning
//! - sled-backed storage with dedup-by-link and a replayable raw-HTML cache

pub mod config;
pub mod daemon;
pub mod enrichment;
pub mod export;
pub mod scraping;
pub mod status;
pub mod storage;
pub mod types;
pub mod util;

pub use config::Config;
pub use types::*;
