//! Long-running crawl service
//!
//! `jobscout serve` wires a [`handler::CrawlHandler`] to the HTTP API: clients
//! start predefined or custom-term crawls, poll their progress, request a
//! stop, and download the stored jobs as CSV.

pub mod handler;
pub mod http;

pub use handler::{CrawlHandler, StartError};
pub use http::HttpServer;
