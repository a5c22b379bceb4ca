//! The parallel crawl engine
//!
//! One crawl is a tree of traversal tasks: one root task per start URL, one
//! child task per outbound link discovered on a fetched page, each child
//! with one less hop of depth budget. Tasks run on the tokio scheduler; a
//! semaphore fixed at engine construction bounds how many fetches are in
//! flight at once, so exponential link fan-out cannot oversubscribe the
//! network. A parent task completes only after all of its children have
//! completed, and the `crawl` call returns only after the whole tree is
//! done.
//!
//! There is no cancellation signal. Every task re-checks the shared
//! deadline before doing any work, which terminates the crawl within one
//! task invocation of the deadline passing. A fetch already in flight when
//! the deadline passes is allowed to finish; the deadline only stops new
//! fetches from starting. That trade-off is deliberate: it keeps the
//! traversal free of abort plumbing at the cost of a soft cutoff.

use crate::crawler::fetcher::{PageContent, PageFetcher};
use crate::crawler::ranking::rank_words;
use crate::crawler::state::{VisitedSet, WordCounts};
use crate::crawler::CrawlParameters;
use crate::CrawlError;
use futures::future::BoxFuture;
use futures::FutureExt;
use regex::Regex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Final output of one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    /// Top-ranked words and their occurrence totals, in rank order
    pub word_counts: Vec<(String, u64)>,

    /// Number of distinct URLs actually fetched
    pub urls_visited: usize,
}

/// The crawl orchestrator
///
/// Construction validates the parameters and fixes the fetch-slot pool for
/// the engine's lifetime; `crawl` may then be called any number of times,
/// each call with fresh visited/word-count state.
pub struct CrawlEngine<F> {
    fetcher: Arc<F>,
    fetch_slots: Arc<Semaphore>,
    ignored_urls: Arc<Vec<Regex>>,
    max_depth: u32,
    timeout: Duration,
    popular_word_count: usize,
}

impl<F: PageFetcher + 'static> CrawlEngine<F> {
    /// Creates an engine for the given fetcher and parameters
    ///
    /// Fails fast on invalid parameters, before any task exists. The fetch
    /// pool is sized to the requested parallelism capped by the number of
    /// available cores.
    pub fn new(fetcher: F, params: &CrawlParameters) -> crate::Result<Self> {
        if params.parallelism == 0 {
            return Err(CrawlError::InvalidParameters(
                "parallelism must be at least 1".to_string(),
            ));
        }

        let hardware = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let pool_size = params.parallelism.min(hardware);

        tracing::debug!(
            "Crawl engine using {} fetch slots (requested {}, {} cores available)",
            pool_size,
            params.parallelism,
            hardware
        );

        Ok(Self {
            fetcher: Arc::new(fetcher),
            fetch_slots: Arc::new(Semaphore::new(pool_size)),
            ignored_urls: Arc::new(params.ignored_urls.clone()),
            max_depth: params.max_depth,
            timeout: params.timeout,
            popular_word_count: params.popular_word_count,
        })
    }

    /// Crawls from the given start URLs and aggregates word counts
    ///
    /// Spawns one traversal task per start URL with the full depth budget,
    /// waits for the entire task tree to finish, then ranks the
    /// accumulated counts. Per-URL fetch failures are absorbed inside the
    /// traversal; this call itself cannot fail.
    pub async fn crawl(&self, start_urls: &[String]) -> CrawlResult {
        let context = Arc::new(CrawlContext {
            fetcher: Arc::clone(&self.fetcher),
            fetch_slots: Arc::clone(&self.fetch_slots),
            ignored_urls: Arc::clone(&self.ignored_urls),
            deadline: Instant::now() + self.timeout,
            visited: VisitedSet::new(),
            counts: WordCounts::new(),
        });

        let mut roots = JoinSet::new();
        for url in start_urls {
            roots.spawn(Arc::clone(&context).visit(url.clone(), self.max_depth));
        }
        while roots.join_next().await.is_some() {}

        let urls_visited = context.visited.len();
        let counts = context.counts.snapshot();

        tracing::info!(
            "Crawl finished: {} URLs visited, {} distinct words",
            urls_visited,
            counts.len()
        );

        // No words recorded: nothing to rank, but the visited count still
        // stands (a crawl can fetch pages that contain no words at all)
        if counts.is_empty() {
            return CrawlResult {
                word_counts: Vec::new(),
                urls_visited,
            };
        }

        CrawlResult {
            word_counts: rank_words(counts, self.popular_word_count),
            urls_visited,
        }
    }
}

/// State shared by every traversal task of one `crawl` call
///
/// Created fresh per call and dropped after ranking; nothing in it outlives
/// the call.
struct CrawlContext<F> {
    fetcher: Arc<F>,
    fetch_slots: Arc<Semaphore>,
    ignored_urls: Arc<Vec<Regex>>,
    deadline: Instant,
    visited: VisitedSet,
    counts: WordCounts,
}

impl<F: PageFetcher + 'static> CrawlContext<F> {
    /// One traversal task: crawl `url` and everything reachable from it
    /// within `remaining_depth` hops, subject to the shared deadline.
    ///
    /// The rejection checks run in a fixed order, each before any
    /// shared-state mutation or network work: depth, deadline, ignore
    /// patterns, then the visited-set claim. Only a URL that passes all
    /// four is fetched, and the claim guarantees at most one fetch per URL
    /// per crawl however many tasks race on it.
    fn visit(self: Arc<Self>, url: String, remaining_depth: u32) -> BoxFuture<'static, ()> {
        async move {
            if remaining_depth == 0 {
                return;
            }
            if Instant::now() > self.deadline {
                return;
            }
            if self
                .ignored_urls
                .iter()
                .any(|pattern| pattern.is_match(&url))
            {
                return;
            }
            if !self.visited.claim(&url) {
                return;
            }

            // The permit bounds in-flight fetches to the pool size; it is
            // released before waiting on children so deep fan-out cannot
            // starve the pool.
            let page = {
                let _permit = match self.fetch_slots.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };

                match self.fetcher.fetch(&url).await {
                    Ok(page) => page,
                    Err(e) => {
                        // A failed fetch is an empty page: the branch ends
                        // here without disturbing any sibling task
                        tracing::debug!("Fetch failed for {}: {}", url, e);
                        PageContent::empty()
                    }
                }
            };

            self.counts.merge(&page.word_counts);

            let mut children = JoinSet::new();
            for link in page.links {
                children.spawn(Arc::clone(&self).visit(link, remaining_depth - 1));
            }

            // This task is done only when its whole subtree is done
            while children.join_next().await.is_some() {}
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// In-memory fetcher over a fixed link graph, recording how often each
    /// URL is fetched
    struct StubFetcher {
        pages: HashMap<String, PageContent>,
        failing: HashSet<String>,
        fetch_counts: Arc<Mutex<HashMap<String, u32>>>,
    }

    impl StubFetcher {
        fn new() -> Self {
            Self {
                pages: HashMap::new(),
                failing: HashSet::new(),
                fetch_counts: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        fn page(mut self, url: &str, words: &[(&str, u64)], links: &[&str]) -> Self {
            let content = PageContent {
                word_counts: words
                    .iter()
                    .map(|(word, count)| (word.to_string(), *count))
                    .collect(),
                links: links.iter().map(|link| link.to_string()).collect(),
            };
            self.pages.insert(url.to_string(), content);
            self
        }

        fn failing(mut self, url: &str) -> Self {
            self.failing.insert(url.to_string());
            self
        }

        fn counter(&self) -> Arc<Mutex<HashMap<String, u32>>> {
            Arc::clone(&self.fetch_counts)
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> crate::Result<PageContent> {
            *self
                .fetch_counts
                .lock()
                .unwrap()
                .entry(url.to_string())
                .or_insert(0) += 1;

            if self.failing.contains(url) {
                return Err(CrawlError::HttpStatus {
                    url: url.to_string(),
                    status: 500,
                });
            }

            Ok(self.pages.get(url).cloned().unwrap_or_default())
        }
    }

    fn params(max_depth: u32, timeout_secs: u64, parallelism: usize) -> CrawlParameters {
        CrawlParameters {
            start_pages: vec![],
            ignored_urls: vec![],
            parallelism,
            max_depth,
            timeout: Duration::from_secs(timeout_secs),
            popular_word_count: 10,
        }
    }

    fn fetches(counter: &Arc<Mutex<HashMap<String, u32>>>, url: &str) -> u32 {
        counter.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    #[tokio::test]
    async fn test_cycle_is_fetched_once() {
        // a -> b, c; b -> a (cycle); depth 2 reaches all three exactly once
        let fetcher = StubFetcher::new()
            .page("http://a", &[("alpha", 1)], &["http://b", "http://c"])
            .page("http://b", &[("beta", 1)], &["http://a"])
            .page("http://c", &[("gamma", 1)], &[]);
        let counter = fetcher.counter();

        let engine = CrawlEngine::new(fetcher, &params(2, 60, 4)).unwrap();
        let result = engine.crawl(&["http://a".to_string()]).await;

        assert_eq!(result.urls_visited, 3);
        assert_eq!(fetches(&counter, "http://a"), 1);
        assert_eq!(fetches(&counter, "http://b"), 1);
        assert_eq!(fetches(&counter, "http://c"), 1);
    }

    #[tokio::test]
    async fn test_depth_zero_fetches_nothing() {
        let fetcher = StubFetcher::new().page("http://a", &[("alpha", 1)], &[]);
        let counter = fetcher.counter();

        let engine = CrawlEngine::new(fetcher, &params(0, 60, 4)).unwrap();
        let result = engine.crawl(&["http://a".to_string()]).await;

        assert_eq!(result.urls_visited, 0);
        assert!(result.word_counts.is_empty());
        assert_eq!(fetches(&counter, "http://a"), 0);
    }

    #[tokio::test]
    async fn test_depth_one_fetches_only_start_pages() {
        let fetcher = StubFetcher::new()
            .page("http://a", &[("alpha", 1)], &["http://b"])
            .page("http://b", &[("beta", 1)], &[]);
        let counter = fetcher.counter();

        let engine = CrawlEngine::new(fetcher, &params(1, 60, 4)).unwrap();
        let result = engine.crawl(&["http://a".to_string()]).await;

        assert_eq!(result.urls_visited, 1);
        assert_eq!(fetches(&counter, "http://b"), 0);
        assert_eq!(result.word_counts, vec![("alpha".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_url_on_shorter_path_is_fetched() {
        // c is two hops away through b but one hop away directly; with
        // depth 2 the direct path gets it fetched
        let fetcher = StubFetcher::new()
            .page("http://a", &[], &["http://b", "http://c"])
            .page("http://b", &[], &["http://c"])
            .page("http://c", &[("gamma", 1)], &[]);

        let engine = CrawlEngine::new(fetcher, &params(2, 60, 4)).unwrap();
        let result = engine.crawl(&["http://a".to_string()]).await;

        assert_eq!(result.urls_visited, 3);
        assert_eq!(result.word_counts, vec![("gamma".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_zero_timeout_fetches_nothing() {
        let fetcher = StubFetcher::new().page("http://a", &[("alpha", 1)], &[]);
        let counter = fetcher.counter();

        let engine = CrawlEngine::new(fetcher, &params(3, 0, 4)).unwrap();
        let result = engine.crawl(&["http://a".to_string()]).await;

        assert_eq!(result.urls_visited, 0);
        assert!(result.word_counts.is_empty());
        assert_eq!(fetches(&counter, "http://a"), 0);
    }

    #[tokio::test]
    async fn test_ignored_start_url_contributes_nothing() {
        let fetcher = StubFetcher::new()
            .page("http://skip-me", &[("secret", 5)], &[])
            .page("http://a", &[("alpha", 1)], &[]);
        let counter = fetcher.counter();

        let mut p = params(2, 60, 4);
        p.ignored_urls = vec![Regex::new("skip-me").unwrap()];

        let engine = CrawlEngine::new(fetcher, &p).unwrap();
        let result = engine
            .crawl(&["http://skip-me".to_string(), "http://a".to_string()])
            .await;

        assert_eq!(result.urls_visited, 1);
        assert_eq!(result.word_counts, vec![("alpha".to_string(), 1)]);
        assert_eq!(fetches(&counter, "http://skip-me"), 0);
    }

    #[tokio::test]
    async fn test_ignored_link_is_not_followed() {
        let fetcher = StubFetcher::new()
            .page("http://a", &[("alpha", 1)], &["http://b.pdf", "http://c"])
            .page("http://b.pdf", &[("binary", 1)], &[])
            .page("http://c", &[("gamma", 1)], &[]);
        let counter = fetcher.counter();

        let mut p = params(3, 60, 4);
        p.ignored_urls = vec![Regex::new(r"\.pdf$").unwrap()];

        let engine = CrawlEngine::new(fetcher, &p).unwrap();
        let result = engine.crawl(&["http://a".to_string()]).await;

        assert_eq!(result.urls_visited, 2);
        assert_eq!(fetches(&counter, "http://b.pdf"), 0);
        assert!(!result
            .word_counts
            .iter()
            .any(|(word, _)| word == "binary"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_not_fatal() {
        // The failing URL still counts as visited (it was fetched), but
        // contributes nothing; its siblings crawl normally
        let fetcher = StubFetcher::new()
            .page("http://a", &[("alpha", 1)], &["http://broken", "http://c"])
            .failing("http://broken")
            .page("http://c", &[("gamma", 2)], &[]);

        let engine = CrawlEngine::new(fetcher, &params(2, 60, 4)).unwrap();
        let result = engine.crawl(&["http://a".to_string()]).await;

        assert_eq!(result.urls_visited, 3);
        assert_eq!(
            result.word_counts,
            vec![("gamma".to_string(), 2), ("alpha".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_duplicate_links_fetch_once() {
        let fetcher = StubFetcher::new()
            .page("http://a", &[], &["http://b", "http://b", "http://b"])
            .page("http://b", &[("beta", 1)], &[]);
        let counter = fetcher.counter();

        let engine = CrawlEngine::new(fetcher, &params(2, 60, 4)).unwrap();
        let result = engine.crawl(&["http://a".to_string()]).await;

        assert_eq!(result.urls_visited, 2);
        assert_eq!(fetches(&counter, "http://b"), 1);
        assert_eq!(result.word_counts, vec![("beta".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_no_words_returns_empty_mapping() {
        let fetcher = StubFetcher::new()
            .page("http://a", &[], &["http://b"])
            .page("http://b", &[], &[]);

        let engine = CrawlEngine::new(fetcher, &params(2, 60, 4)).unwrap();
        let result = engine.crawl(&["http://a".to_string()]).await;

        assert!(result.word_counts.is_empty());
        assert_eq!(result.urls_visited, 2);
    }

    fn diamond_graph() -> StubFetcher {
        // a and b both link to shared; words overlap across pages
        StubFetcher::new()
            .page(
                "http://a",
                &[("common", 2), ("alpha", 1)],
                &["http://shared"],
            )
            .page(
                "http://b",
                &[("common", 3), ("beta", 1)],
                &["http://shared"],
            )
            .page("http://shared", &[("common", 1), ("deep", 4)], &[])
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_word_counts_independent_of_parallelism() {
        let start = vec!["http://a".to_string(), "http://b".to_string()];

        let serial_engine = CrawlEngine::new(diamond_graph(), &params(2, 60, 1)).unwrap();
        let serial = serial_engine.crawl(&start).await;

        let parallel_engine = CrawlEngine::new(diamond_graph(), &params(2, 60, 8)).unwrap();
        let parallel = parallel_engine.crawl(&start).await;

        assert_eq!(serial, parallel);
        assert_eq!(serial.urls_visited, 3);

        // common: 2 + 3 + 1 across the three pages, merged exactly once each
        assert!(serial
            .word_counts
            .contains(&("common".to_string(), 6)));
    }

    #[tokio::test]
    async fn test_ranking_is_applied_to_result() {
        let fetcher = StubFetcher::new().page(
            "http://a",
            &[("a", 3), ("bb", 3), ("ccc", 2)],
            &[],
        );

        let mut p = params(1, 60, 2);
        p.popular_word_count = 2;

        let engine = CrawlEngine::new(fetcher, &p).unwrap();
        let result = engine.crawl(&["http://a".to_string()]).await;

        assert_eq!(
            result.word_counts,
            vec![("bb".to_string(), 3), ("a".to_string(), 3)]
        );
    }

    #[tokio::test]
    async fn test_zero_parallelism_rejected() {
        let fetcher = StubFetcher::new();
        let result = CrawlEngine::new(fetcher, &params(2, 60, 0));
        assert!(matches!(result, Err(CrawlError::InvalidParameters(_))));
    }
}
