use crate::config::types::{Config, CrawlerConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.parallelism < 1 || config.parallelism > 100 {
        return Err(ConfigError::Validation(format!(
            "parallelism must be between 1 and 100, got {}",
            config.parallelism
        )));
    }

    // max_depth, timeout_seconds, and popular_word_count are unsigned and may
    // all be zero: depth 0 and timeout 0 are legal empty-crawl boundaries,
    // and popular-word-count 0 keeps no words.

    for page in &config.start_pages {
        validate_start_page(page)?;
    }

    for pattern in &config.ignored_urls {
        validate_pattern(pattern)?;
    }

    Ok(())
}

/// Validates a single start page URL
fn validate_start_page(page: &str) -> Result<(), ConfigError> {
    let url = Url::parse(page)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start page '{}': {}", page, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Start page '{}' must use the http or https scheme",
            page
        )));
    }

    Ok(())
}

/// Validates that an ignored-URL pattern compiles as a regular expression
fn validate_pattern(pattern: &str) -> Result<(), ConfigError> {
    regex::Regex::new(pattern)
        .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;
    Ok(())
}
