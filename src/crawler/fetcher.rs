//! Page fetching for the crawl engine
//!
//! The crawl engine sees pages only through the [`PageFetcher`] trait: given
//! a URL it gets back the page's word counts and outbound links. The
//! production implementation fetches over HTTP and parses HTML; tests
//! substitute an in-memory implementation.

use crate::crawler::parser::parse_page;
use crate::CrawlError;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// A fetched page reduced to what the crawl engine consumes
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Occurrences of each word on the page
    pub word_counts: HashMap<String, u64>,

    /// Outbound links discovered on the page (absolute URLs)
    pub links: Vec<String>,
}

impl PageContent {
    /// A page with no words and no links
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Fetches and parses one page
///
/// Implementations may fail per URL; the crawl engine treats any failure as
/// an empty page for that URL and continues with the rest of the crawl.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> crate::Result<PageContent>;
}

/// Builds the HTTP client used by [`HttpFetcher`]
///
/// The user agent is derived from the crate name and version. Compressed
/// responses are accepted; request and connect timeouts keep a single slow
/// server from eating the crawl's whole time budget.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP implementation of [`PageFetcher`]
///
/// Fetches the URL with a GET request and parses the body as HTML. Non-HTML
/// responses yield an empty page; non-success status codes are errors, which
/// the engine absorbs as empty pages.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a freshly built HTTP client
    pub fn new() -> crate::Result<Self> {
        Ok(Self {
            client: build_http_client()?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> crate::Result<PageContent> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| CrawlError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Check Content-Type before parsing the body as HTML
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.contains("text/html") {
            tracing::debug!("Skipping non-HTML response from {}: {}", url, content_type);
            return Ok(PageContent::empty());
        }

        // Resolve relative links against the final URL after redirects
        let base_url: Url = response.url().clone();

        let body = response.text().await.map_err(|source| CrawlError::Http {
            url: url.to_string(),
            source,
        })?;

        let parsed = parse_page(&body, &base_url);

        Ok(PageContent {
            word_counts: parsed.word_counts,
            links: parsed.links,
        })
    }
}
