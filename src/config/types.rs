use serde::Deserialize;

/// Main configuration structure for lexicrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URLs the crawl starts from, in order
    #[serde(rename = "start-pages")]
    pub start_pages: Vec<String>,

    /// Regular expressions; URLs matching any of them are never fetched
    #[serde(rename = "ignored-urls", default)]
    pub ignored_urls: Vec<String>,

    /// Requested number of concurrent fetches (capped by available cores)
    pub parallelism: usize,

    /// Maximum link depth from any start page; 0 fetches nothing
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Wall-clock budget for the whole crawl, in seconds
    #[serde(rename = "timeout-seconds")]
    pub timeout_seconds: u64,

    /// Number of top-ranked words to keep in the result
    #[serde(rename = "popular-word-count")]
    pub popular_word_count: usize,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path the crawl result JSON is appended to; empty means stdout
    #[serde(rename = "result-path", default)]
    pub result_path: String,

    /// Path the profiling report is appended to; empty means stdout
    #[serde(rename = "profile-path", default)]
    pub profile_path: String,
}
