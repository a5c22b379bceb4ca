//! Shared mutable state of one crawl invocation
//!
//! Every traversal task of a crawl shares exactly two pieces of mutable
//! state: the set of URLs already claimed for fetching, and the running
//! word-count totals. Both live behind a single mutex each and expose only
//! the operations the engine needs: an atomic test-and-set and an atomic
//! batch merge. Neither exposes iteration while the crawl is active.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Dedup record of URLs already claimed for fetching
///
/// The claim is a test-and-set: "has this URL been claimed" and "claim it"
/// are one critical section, so at most one task ever proceeds to fetch a
/// given URL no matter how many tasks race on it.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL for fetching
    ///
    /// Returns true if this caller made the claim, false if the URL was
    /// already claimed. A claim is never released.
    pub fn claim(&self, url: &str) -> bool {
        let mut urls = self.urls.lock().unwrap();
        urls.insert(url.to_string())
    }

    /// Number of URLs claimed so far
    pub fn len(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Running word-occurrence totals across all fetched pages
///
/// A page's counts are merged as one batch under the lock, so concurrent
/// merges from sibling tasks can never lose an increment.
#[derive(Debug, Default)]
pub struct WordCounts {
    counts: Mutex<HashMap<String, u64>>,
}

impl WordCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page's word counts to the running totals
    pub fn merge(&self, page_counts: &HashMap<String, u64>) {
        let mut counts = self.counts.lock().unwrap();
        for (word, count) in page_counts {
            *counts.entry(word.clone()).or_insert(0) += count;
        }
    }

    /// Copies out the accumulated totals
    ///
    /// Meant for the post-traversal ranking step, after every task has
    /// completed.
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counts.lock().unwrap().clone()
    }
}
