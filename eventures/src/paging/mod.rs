//! Page bookkeeping for the remote result set.
//!
//! The events API is offset/limit based and does not report a total. Whether
//! a next page exists is therefore found out by asking for a single record
//! just past the current page, and only when the current page came back full.
//!
//! # Example
//!
//! ```ignore
//! let mut cursor = PageCursor::new(20);
//! cursor.record_results_seen(0, 20);
//!
//! let next = cursor
//!     .has_next_page(|probe| source.fetch(probe.into_request(query)))
//!     .await?;
//! ```

use std::future::Future;

use tracing::debug;

use crate::source::{FetchRequest, SourceError};

/// Number of events requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Number of events requested when probing for a following page.
pub const DEFAULT_PROBE_LIMIT: usize = 1;

/// A minimal fetch used to test whether a page exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProbe {
    /// Index of the page being probed.
    pub page: u32,
    /// Offset of the first record of that page.
    pub offset: usize,
    /// Records to request.
    pub limit: usize,
}

impl PageProbe {
    /// Turn the probe into a fetch request for `query`.
    pub fn into_request(self, query: impl Into<String>) -> FetchRequest {
        FetchRequest {
            query: query.into(),
            limit: self.limit,
            offset: self.offset,
            ..Default::default()
        }
    }
}

/// Running pagination state for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    page_size: usize,
    probe_limit: usize,
    current_page: u32,
    current_page_results: usize,
    results_seen_total: usize,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageCursor {
    /// Create a cursor for pages of `page_size` results.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            probe_limit: DEFAULT_PROBE_LIMIT,
            current_page: 0,
            current_page_results: 0,
            results_seen_total: 0,
        }
    }

    /// Set how many records a probe asks for.
    pub fn with_probe_limit(mut self, probe_limit: usize) -> Self {
        self.probe_limit = probe_limit;
        self
    }

    /// Whether loading `page` starts a fresh search.
    pub fn should_reset_on_page(page: u32) -> bool {
        page == 0
    }

    /// Record that `page` returned `count` results.
    ///
    /// Page 0 starts a new search: the running total is cleared first.
    pub fn record_results_seen(&mut self, page: u32, count: usize) {
        if Self::should_reset_on_page(page) {
            self.results_seen_total = 0;
        }
        self.results_seen_total += count;
        self.current_page = page;
        self.current_page_results = count;
    }

    /// Page most recently recorded.
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Results returned by the current page.
    pub fn current_page_results(&self) -> usize {
        self.current_page_results
    }

    /// Results seen across all pages of the current query.
    pub fn results_seen_total(&self) -> usize {
        self.results_seen_total
    }

    /// Configured page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Whether a page of `count` results could have a successor.
    ///
    /// Only an exactly full page can. Zero results never can.
    pub fn page_is_full(count: usize, page_size: usize) -> bool {
        page_size > 0 && count >= page_size && count % page_size == 0
    }

    /// The probe that would test for the page after the current one.
    pub fn next_probe(&self) -> PageProbe {
        let page = self.current_page + 1;
        PageProbe {
            page,
            offset: page as usize * self.page_size,
            limit: self.probe_limit,
        }
    }

    /// Find out whether a page follows the current one.
    ///
    /// Returns `Ok(Some(page + 1))` when it exists and `Ok(None)` when it does
    /// not. The probe is only invoked when the current page is full; a short
    /// page proves there is nothing after it.
    ///
    /// # Errors
    ///
    /// Propagates the probe's [`SourceError`].
    pub async fn has_next_page<F, Fut, T>(&self, probe: F) -> Result<Option<u32>, SourceError>
    where
        F: FnOnce(PageProbe) -> Fut,
        Fut: Future<Output = Result<Vec<T>, SourceError>>,
    {
        if !Self::page_is_full(self.current_page_results, self.page_size) {
            debug!(
                page = self.current_page,
                results = self.current_page_results,
                "Current page not full, no next page"
            );
            return Ok(None);
        }

        let request = self.next_probe();
        let found = probe(request).await?;
        debug!(
            page = request.page,
            offset = request.offset,
            found = found.len(),
            "Probed for next page"
        );

        Ok((!found.is_empty()).then_some(request.page))
    }

    /// The page before the current one, if any.
    pub fn has_previous_page(&self) -> Option<u32> {
        self.current_page.checked_sub(1)
    }
}
