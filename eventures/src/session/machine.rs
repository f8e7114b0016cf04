//! Synchronous session state machine.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::config::{ConfigError, SessionConfig};
use super::types::{FetchTicket, RenderFrame, SearchOutcome, SessionState};
use crate::aggregate::{aggregate, AggregatedPoint, PointList};
use crate::markers::{MarkerId, MarkerRegistry};
use crate::navigation::NavigationCursor;
use crate::paging::PageCursor;
use crate::source::{FetchRequest, RawEventRecord, SourceError};
use crate::telemetry::SessionMetrics;

/// Session-scoped state for one map view.
///
/// Owns the current point list, marker ids, navigation cursor and page
/// bookkeeping, and publishes a [`RenderFrame`] on every visible change.
///
/// Fetching is split in two so the caller can await the event source without
/// holding the session: [`begin_search`](Self::begin_search) issues a
/// [`FetchTicket`], [`complete_search`](Self::complete_search) applies the
/// result. Every ticket carries a generation; only the newest one is applied.
///
/// # Reset triggers
///
/// - Page 0 clears the running result count.
/// - Every applied result replaces the marker ids and refocuses the first point.
/// - A failed fetch changes nothing.
#[derive(Debug)]
pub struct MapSession {
    config: SessionConfig,
    state: SessionState,
    settled: SessionState,
    query: String,
    markers: MarkerRegistry,
    navigation: NavigationCursor,
    pages: PageCursor,
    generation: u64,
    frames: watch::Sender<RenderFrame>,
    metrics: Arc<SessionMetrics>,
}

impl MapSession {
    /// Create an idle session.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        Self::with_metrics(config, Arc::new(SessionMetrics::new()))
    }

    /// Create an idle session reporting into shared `metrics`.
    pub fn with_metrics(
        config: SessionConfig,
        metrics: Arc<SessionMetrics>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let pages = PageCursor::new(config.page_size).with_probe_limit(config.probe_limit);
        let (frames, _) = watch::channel(RenderFrame::default());

        Ok(Self {
            config,
            state: SessionState::Idle,
            settled: SessionState::Idle,
            query: String::new(),
            markers: MarkerRegistry::new(),
            navigation: NavigationCursor::new(),
            pages,
            generation: 0,
            frames,
            metrics,
        })
    }

    /// Start a search for `query` at `page`.
    ///
    /// Supersedes any fetch still in flight. The returned ticket must be
    /// passed to [`complete_search`](Self::complete_search) with the result.
    pub fn begin_search(&mut self, query: &str, page: u32) -> FetchTicket {
        self.generation += 1;
        self.state = if PageCursor::should_reset_on_page(page) {
            SessionState::Searching
        } else {
            SessionState::Paging
        };
        self.metrics.search_started();

        let request = FetchRequest::page(query, page, self.config.page_size)
            .with_filters(self.config.filters.clone())
            .with_exact_page(self.config.exact_page);

        debug!(
            generation = self.generation,
            query = %query,
            page,
            offset = request.offset,
            "Search started"
        );

        FetchTicket {
            generation: self.generation,
            page,
            request,
        }
    }

    /// Apply the result of the fetch issued as `ticket`.
    ///
    /// A page with no usable points clears the display: marker ids are
    /// replaced by an empty set and focus becomes `None`.
    pub fn complete_search(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<RawEventRecord>, SourceError>,
    ) -> SearchOutcome {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                latest = self.generation,
                "Discarding superseded result"
            );
            self.metrics.result_superseded();
            return SearchOutcome::Superseded;
        }

        let records = match result {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, state = %self.settled, "Event source failed, keeping current markers");
                self.metrics.source_failure();
                self.state = self.settled;
                return SearchOutcome::Unavailable(e);
            }
        };

        let page = ticket.page;
        self.pages.record_results_seen(page, records.len());
        self.query = ticket.request.query;

        let aggregation = aggregate(&records);
        let dropped = aggregation.dropped_records;
        self.metrics.records_fetched(records.len(), dropped);

        let points = aggregation.points.len();
        self.install(aggregation.points);
        self.state = SessionState::Loaded;
        self.settled = SessionState::Loaded;

        if points == 0 {
            info!(query = %self.query, page, dropped, "Search returned no markers");
            self.metrics.empty_result();
            SearchOutcome::Empty { page, dropped }
        } else {
            info!(query = %self.query, page, points, dropped, "Search loaded");
            self.metrics.search_loaded();
            SearchOutcome::Loaded {
                page,
                points,
                dropped,
            }
        }
    }

    /// Focus the next marker, wrapping at the end.
    pub fn step_next(&mut self) -> Option<usize> {
        let focus = self.navigation.next(self.markers.len());
        self.publish();
        focus
    }

    /// Focus the previous marker, wrapping at the start.
    pub fn step_previous(&mut self) -> Option<usize> {
        let focus = self.navigation.previous(self.markers.len());
        self.publish();
        focus
    }

    /// Focus the marker the user clicked.
    ///
    /// Ids left over from an earlier pass are ignored.
    pub fn resolve_click(&mut self, id: MarkerId) -> Option<usize> {
        match self.markers.resolve(id) {
            Ok(_) => {
                let focus = self.navigation.set(id.index(), self.markers.len());
                self.publish();
                focus
            }
            Err(e) => {
                debug!(error = %e, pass = self.markers.pass(), "Ignoring click on stale marker");
                None
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Query of the points on display.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Generation of the newest search issued.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Points on display.
    pub fn points(&self) -> &PointList {
        self.markers.points()
    }

    /// Marker ids of the points on display.
    pub fn markers(&self) -> &MarkerRegistry {
        &self.markers
    }

    /// Index of the focused point.
    pub fn focus_index(&self) -> Option<usize> {
        self.navigation.current()
    }

    /// The focused point.
    pub fn focus(&self) -> Option<&AggregatedPoint> {
        self.focus_index().and_then(|index| self.points().get(index))
    }

    /// Page bookkeeping for the current query.
    pub fn pages(&self) -> &PageCursor {
        &self.pages
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Shared telemetry counters.
    pub fn metrics(&self) -> &Arc<SessionMetrics> {
        &self.metrics
    }

    /// The page before the current one, if any.
    pub fn previous_page(&self) -> Option<u32> {
        self.pages.has_previous_page()
    }

    /// The frame currently on display.
    pub fn frame(&self) -> RenderFrame {
        self.frames.borrow().clone()
    }

    /// Subscribe to render frames.
    ///
    /// The receiver sees the current frame immediately and every change after it.
    pub fn subscribe(&self) -> watch::Receiver<RenderFrame> {
        self.frames.subscribe()
    }

    fn install(&mut self, points: PointList) {
        self.markers.assign_ids(Arc::new(points));
        self.navigation.reset(self.markers.len());
        self.publish();
    }

    fn publish(&self) {
        self.frames.send_replace(RenderFrame {
            generation: self.generation,
            markers: self.markers.clone(),
            focus: self.navigation.current(),
        });
    }
}
