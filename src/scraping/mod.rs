//! Job-portal crawling and extraction pipeline
//!
//! Data flows leaf-first through these components:
//! - `HttpFetcher`: GET with retry/backoff, browser headers and politeness delays
//! - `clean_html`: strips navigation, script and style noise
//! - `FieldExtractor`: the ordered strategy cascade producing raw fields
//! - `RecordCleaner`: normalizes raw fields into canonical values
//! - `CrawlCoordinator`: walks paginated search results per term and domain

pub mod cleaner;
pub mod coordinator;
pub mod extractor;
pub mod fetcher;
pub mod links;
pub mod normalizer;
pub mod politeness;
pub mod retry;

pub use cleaner::RecordCleaner;
pub use coordinator::{CrawlCoordinator, CrawlEvent, CrawlStats, PageError, PageReport};
pub use extractor::{ExtractError, FieldExtractor};
pub use fetcher::{FetchConfig, FetchError, FetchResult, HttpFetcher, PageFetcher};
pub use links::{extract_job_links, LinkFilter, SearchPageLinks};
pub use normalizer::clean_html;
pub use politeness::RequestDelay;
pub use retry::RetryPolicy;
