//! Async front end tying a session to an event source.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::config::{ConfigError, SessionConfig};
use super::machine::MapSession;
use super::types::{RenderFrame, SearchOutcome, SessionState};
use crate::markers::MarkerId;
use crate::source::{EventSource, FetchRequest, RawEventRecord, SourceError};
use crate::telemetry::MetricsSnapshot;

/// Shared handle to a [`MapSession`] and the source feeding it.
///
/// Cloning the handle shares the session. The session lock is only held for
/// state updates, never while waiting on the source, so stepping through
/// markers stays responsive while a fetch is in flight. If two searches
/// overlap, the later one wins and the earlier result is discarded.
///
/// # Example
///
/// ```ignore
/// use eventures::session::{SessionConfig, SessionHandle};
///
/// let handle = SessionHandle::new(source, SessionConfig::default())?;
/// let outcome = handle.search("jazz", 0).await;
/// if outcome.is_success() {
///     handle.step_next();
/// }
/// ```
pub struct SessionHandle<S: EventSource + ?Sized> {
    source: Arc<S>,
    session: Arc<Mutex<MapSession>>,
}

impl<S: EventSource + ?Sized> Clone for SessionHandle<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            session: Arc::clone(&self.session),
        }
    }
}

impl<S: EventSource + ?Sized> std::fmt::Debug for SessionHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session", &*self.session.lock())
            .finish_non_exhaustive()
    }
}

/// Result of looking for the page after the current one.
enum NextPageProbe {
    Idle,
    Busy,
    Probed {
        generation: u64,
        query: String,
        result: Result<Option<u32>, SourceError>,
    },
}

impl<S: EventSource + ?Sized> SessionHandle<S> {
    /// Create a handle over a new idle session.
    pub fn new(source: Arc<S>, config: SessionConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_session(source, MapSession::new(config)?))
    }

    /// Wrap an existing session.
    pub fn from_session(source: Arc<S>, session: MapSession) -> Self {
        Self {
            source,
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Search for `query` starting at `page`.
    ///
    /// Page 0 starts a fresh search; later pages continue the page count.
    pub async fn search(&self, query: &str, page: u32) -> SearchOutcome {
        let (ticket, timeout) = {
            let mut session = self.session.lock();
            let ticket = session.begin_search(query, page);
            (ticket, session.config().fetch_timeout)
        };

        let result = self.fetch(ticket.request.clone(), timeout).await;

        self.session.lock().complete_search(ticket, result)
    }

    /// Load the page after the current one, if the source has it.
    ///
    /// Only probes the source when the current page came back full. While a
    /// search is in flight the newer search wins and this returns
    /// [`SearchOutcome::Superseded`] without touching the source.
    pub async fn next_page(&self) -> SearchOutcome {
        let (generation, query, probed) = match self.probe_next_page().await {
            NextPageProbe::Idle => return SearchOutcome::NoSuchPage,
            NextPageProbe::Busy => return SearchOutcome::Superseded,
            NextPageProbe::Probed {
                generation,
                query,
                result,
            } => (generation, query, result),
        };

        if self.session.lock().generation() != generation {
            debug!(generation, "Discarding superseded page probe");
            self.session.lock().metrics().result_superseded();
            return SearchOutcome::Superseded;
        }

        match probed {
            Ok(Some(page)) => self.search(&query, page).await,
            Ok(None) => SearchOutcome::NoSuchPage,
            Err(e) => SearchOutcome::Unavailable(e),
        }
    }

    /// Whether the source has a page after the current one, without loading it.
    ///
    /// Returns `Ok(None)` when the session is idle, a search is in flight, or
    /// a newer search was issued while probing.
    pub async fn has_next_page(&self) -> Result<Option<u32>, SourceError> {
        match self.probe_next_page().await {
            NextPageProbe::Idle | NextPageProbe::Busy => Ok(None),
            NextPageProbe::Probed {
                generation, result, ..
            } => {
                if self.session.lock().generation() != generation {
                    return Ok(None);
                }
                result
            }
        }
    }

    /// Load the page before the current one, if there is one.
    ///
    /// Returns [`SearchOutcome::Superseded`] while a search is in flight.
    pub async fn previous_page(&self) -> SearchOutcome {
        let target = {
            let session = self.session.lock();
            match session.state() {
                SessionState::Idle => None,
                state if state.is_busy() => return SearchOutcome::Superseded,
                _ => session
                    .previous_page()
                    .map(|page| (session.query().to_string(), page)),
            }
        };

        match target {
            Some((query, page)) => self.search(&query, page).await,
            None => SearchOutcome::NoSuchPage,
        }
    }

    /// Focus the next marker.
    pub fn step_next(&self) -> Option<usize> {
        self.session.lock().step_next()
    }

    /// Focus the previous marker.
    pub fn step_previous(&self) -> Option<usize> {
        self.session.lock().step_previous()
    }

    /// Focus a clicked marker; stale ids are ignored.
    pub fn resolve_click(&self, id: MarkerId) -> Option<usize> {
        self.session.lock().resolve_click(id)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.session.lock().state()
    }

    /// The frame currently on display.
    pub fn frame(&self) -> RenderFrame {
        self.session.lock().frame()
    }

    /// Subscribe to render frames.
    pub fn subscribe(&self) -> watch::Receiver<RenderFrame> {
        self.session.lock().subscribe()
    }

    /// Current telemetry counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.session.lock().metrics().snapshot()
    }

    /// Run `f` with the session locked.
    pub fn with_session<R>(&self, f: impl FnOnce(&MapSession) -> R) -> R {
        f(&self.session.lock())
    }

    /// Ask the source whether the page after the settled one exists.
    ///
    /// Shared by [`next_page`](Self::next_page) and
    /// [`has_next_page`](Self::has_next_page) so both go through the fetch
    /// timeout and the probe counters.
    async fn probe_next_page(&self) -> NextPageProbe {
        let (pages, query, filters, exact_page, generation, timeout) = {
            let session = self.session.lock();
            match session.state() {
                SessionState::Idle => return NextPageProbe::Idle,
                state if state.is_busy() => {
                    debug!(%state, "Search in flight, not probing for next page");
                    return NextPageProbe::Busy;
                }
                _ => {}
            }
            (
                session.pages().clone(),
                session.query().to_string(),
                session.config().filters.clone(),
                session.config().exact_page,
                session.generation(),
                session.config().fetch_timeout,
            )
        };

        let result = pages
            .has_next_page(|probe| {
                debug!(page = probe.page, offset = probe.offset, "Probing for next page");
                self.session.lock().metrics().probe_issued();
                let request = probe
                    .into_request(query.as_str())
                    .with_filters(filters)
                    .with_exact_page(exact_page);
                self.fetch(request, timeout)
            })
            .await;

        if let Err(e) = &result {
            warn!(error = %e, "Next page probe failed");
            self.session.lock().metrics().source_failure();
        }

        NextPageProbe::Probed {
            generation,
            query,
            result,
        }
    }

    async fn fetch(
        &self,
        request: FetchRequest,
        timeout: Duration,
    ) -> Result<Vec<RawEventRecord>, SourceError> {
        match tokio::time::timeout(timeout, self.source.fetch(request)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(timeout)),
        }
    }
}
