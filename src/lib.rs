//! Lexicrawl: a bounded parallel word-count crawler
//!
//! This crate implements a depth-limited concurrent web crawler that follows
//! links from a set of start pages, aggregates word-occurrence counts across
//! every page it visits, and reports the most popular words when the crawl
//! finishes or its time budget runs out.

pub mod config;
pub mod crawler;
pub mod output;
pub mod profiler;

use thiserror::Error;

/// Main error type for lexicrawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid crawl parameters: {0}")]
    InvalidParameters(String),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Result serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid ignored-URL pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for lexicrawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, CrawlParameters, CrawlResult, HttpFetcher, PageContent, PageFetcher};
pub use profiler::{Profiler, TimedFetcher};
