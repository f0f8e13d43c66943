//! HTTP API Server Module
//!
//! REST API for starting crawls, polling status, and exporting jobs.

pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;

pub use server::HttpServer;
