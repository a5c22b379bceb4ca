//! Timing decoration for the page fetcher

use crate::crawler::{PageContent, PageFetcher};
use crate::profiler::ProfilingState;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Operation name fetch timings are recorded under
const FETCH_OPERATION: &str = "PageFetcher.fetch";

/// A [`PageFetcher`] that times every fetch before delegating
///
/// Same-shaped as its delegate, so it drops into the crawl engine
/// unchanged. Elapsed time is recorded on success and failure alike.
pub struct TimedFetcher<F> {
    inner: F,
    state: Arc<ProfilingState>,
}

impl<F: PageFetcher> TimedFetcher<F> {
    pub fn new(inner: F, state: Arc<ProfilingState>) -> Self {
        Self { inner, state }
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for TimedFetcher<F> {
    async fn fetch(&self, url: &str) -> crate::Result<PageContent> {
        let start = Instant::now();
        let result = self.inner.fetch(url).await;
        self.state.record(FETCH_OPERATION, start.elapsed());
        result
    }
}
