//! Configuration for a map session.

use std::collections::BTreeMap;
use std::time::Duration;

use thiserror::Error;

use crate::paging::{DEFAULT_PAGE_SIZE, DEFAULT_PROBE_LIMIT};

/// Default time allowed for one fetch against the event source, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Invalid session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("page size must be greater than zero")]
    ZeroPageSize,

    #[error("probe limit must be greater than zero")]
    ZeroProbeLimit,

    #[error("fetch timeout must be greater than zero")]
    ZeroFetchTimeout,
}

/// Settings for a [`MapSession`](super::MapSession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Results requested per page.
    ///
    /// Default: 20.
    pub page_size: usize,

    /// Records requested when probing for a following page.
    ///
    /// Default: 1.
    pub probe_limit: usize,

    /// Time allowed for a single fetch before it counts as unavailable.
    ///
    /// Default: 30 seconds.
    pub fetch_timeout: Duration,

    /// Extra filter fields sent with every fetch.
    pub filters: BTreeMap<String, String>,

    /// Ask the source for exact query matches.
    pub exact_page: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            probe_limit: DEFAULT_PROBE_LIMIT,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            filters: BTreeMap::new(),
            exact_page: false,
        }
    }
}

impl SessionConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the probe limit.
    pub fn with_probe_limit(mut self, probe_limit: usize) -> Self {
        self.probe_limit = probe_limit;
        self
    }

    /// Set the fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Add a filter field.
    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    /// Enable or disable exact-page matching.
    pub fn with_exact_page(mut self, exact_page: bool) -> Self {
        self.exact_page = exact_page;
        self
    }

    /// Check that every limit is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.probe_limit == 0 {
            return Err(ConfigError::ZeroProbeLimit);
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::ZeroFetchTimeout);
        }
        Ok(())
    }
}
