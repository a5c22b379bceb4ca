//! Crawler module: the parallel crawl engine and its collaborators
//!
//! This module contains:
//! - The crawl engine: concurrent, depth- and deadline-bounded traversal of
//!   the link graph with shared visited/word-count state
//! - The page fetcher trait and its HTTP implementation
//! - HTML parsing into word counts and outbound links
//! - Word-count ranking

mod engine;
mod fetcher;
mod parser;
mod ranking;
mod state;

pub use engine::{CrawlEngine, CrawlResult};
pub use fetcher::{build_http_client, HttpFetcher, PageContent, PageFetcher};
pub use parser::{parse_page, ParsedPage};
pub use ranking::rank_words;
pub use state::{VisitedSet, WordCounts};

use crate::config::Config;
use crate::ConfigError;
use regex::Regex;
use std::time::Duration;

/// Validated parameters of one crawl, as consumed by the engine
///
/// Built once from a loaded [`Config`] before the crawl starts; the
/// ignored-URL patterns arrive here already compiled.
#[derive(Debug, Clone)]
pub struct CrawlParameters {
    /// URLs the crawl starts from, in order
    pub start_pages: Vec<String>,

    /// URLs matching any of these patterns are never fetched
    pub ignored_urls: Vec<Regex>,

    /// Requested number of concurrent fetches
    pub parallelism: usize,

    /// Maximum link depth from any start page
    pub max_depth: u32,

    /// Wall-clock budget for the whole crawl
    pub timeout: Duration,

    /// Number of top-ranked words kept in the result
    pub popular_word_count: usize,
}

impl CrawlParameters {
    /// Builds crawl parameters from a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let ignored_urls = config
            .crawler
            .ignored_urls
            .iter()
            .map(|pattern| {
                Regex::new(pattern)
                    .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            start_pages: config.crawler.start_pages.clone(),
            ignored_urls,
            parallelism: config.crawler.parallelism,
            max_depth: config.crawler.max_depth,
            timeout: Duration::from_secs(config.crawler.timeout_seconds),
            popular_word_count: config.crawler.popular_word_count,
        })
    }
}
