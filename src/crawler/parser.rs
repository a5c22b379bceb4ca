//! HTML parser for extracting word counts and outbound links
//!
//! This module reduces a fetched HTML document to the two things the crawl
//! engine consumes:
//! - A multiset of the words appearing in the page text
//! - The outbound links to follow (absolute URLs)

use scraper::node::Node;
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Occurrences of each word in the page text
    pub word_counts: HashMap<String, u64>,

    /// All links found on the page (absolute URLs, de-duplicated)
    pub links: Vec<String>,
}

/// Parses HTML content and extracts word counts and links
///
/// # Word Extraction Rules
///
/// Words are maximal runs of alphanumeric characters in the rendered text,
/// lowercased. Text inside `<script>` and `<style>` elements is excluded.
///
/// # Link Extraction Rules
///
/// **Include:** `<a href="...">` tags, resolved against `base_url`.
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same-page anchors)
/// - `<a href="..." download>`
/// - Non-HTTP(S) URLs after resolution
///
/// Duplicate links are reported once per page.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The base URL for resolving relative links
///
/// # Example
///
/// ```
/// use lexicrawl::crawler::parse_page;
/// use url::Url;
///
/// let html = r#"<html><body><p>hello hello</p><a href="/next">next</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_page(html, &base_url);
/// assert_eq!(parsed.word_counts["hello"], 2);
/// assert_eq!(parsed.links, vec!["https://example.com/next".to_string()]);
/// ```
pub fn parse_page(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    let word_counts = count_words(&document);
    let links = extract_links(&document, base_url);

    ParsedPage { word_counts, links }
}

/// Counts word occurrences in the document text
fn count_words(document: &Html) -> HashMap<String, u64> {
    let mut counts = HashMap::new();

    for node in document.tree.nodes() {
        if let Node::Text(text) = node.value() {
            // Script, style, and head text never reaches the rendered page
            let skipped = node.ancestors().any(|ancestor| match ancestor.value() {
                Node::Element(element) => {
                    matches!(element.name(), "script" | "style" | "head")
                }
                _ => false,
            });
            if skipped {
                continue;
            }

            for word in text.split(|c: char| !c.is_alphanumeric()) {
                if word.is_empty() {
                    continue;
                }
                *counts.entry(word.to_lowercase()).or_insert(0) += 1;
            }
        }
    }

    counts
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            // Skip if it has the download attribute
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    if seen.insert(absolute_url.clone()) {
                        links.push(absolute_url);
                    }
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    // Skip empty hrefs
    if href.is_empty() {
        return None;
    }

    // Skip special schemes
    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Skip fragment-only links (same page anchors)
    if href.starts_with('#') {
        return None;
    }

    // Try to resolve the URL
    match base_url.join(href) {
        Ok(absolute_url) => {
            // Only accept HTTP and HTTPS URLs
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
