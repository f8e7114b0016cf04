//! Integration tests for the map session.
//!
//! These tests drive a `SessionHandle` end to end against scripted event
//! sources:
//! - search → aggregation → marker ids → focus
//! - paging with next-page probes
//! - overlapping searches and superseded results
//! - render frame subscriptions
//!
//! Run with: `cargo test --test session_integration`

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Semaphore;

use eventures::markers::MarkerId;
use eventures::session::{SearchOutcome, SessionConfig, SessionHandle, SessionState};
use eventures::source::{
    BoxFuture, EventSource, FetchRequest, RawEventRecord, SourceError, StaticEventSource,
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Create an event record at the given coordinates.
fn event(name: &str, lat: &str, lng: &str) -> RawEventRecord {
    RawEventRecord::at(lat, lng).with_field("name", name)
}

/// `n` events at distinct coordinates, all named `name`.
fn events(name: &str, n: usize) -> Vec<RawEventRecord> {
    (0..n)
        .map(|i| event(name, &format!("-41.{:03}", i), "174.77"))
        .collect()
}

/// Event source whose fetches wait on a per-query gate.
///
/// Queries without a gate answer immediately.
struct GatedSource {
    inner: StaticEventSource,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    issued: AtomicUsize,
}

impl GatedSource {
    fn new(records: Vec<RawEventRecord>) -> Self {
        Self {
            inner: StaticEventSource::new(records),
            gates: Mutex::new(HashMap::new()),
            issued: AtomicUsize::new(0),
        }
    }

    /// Fetches started, including those still waiting on a gate.
    fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }

    fn gate(&self, query: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates
            .lock()
            .insert(query.to_string(), Arc::clone(&gate));
        gate
    }
}

impl EventSource for GatedSource {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<Vec<RawEventRecord>, SourceError>> {
        self.issued.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().get(&request.query).cloned();
        Box::pin(async move {
            if let Some(gate) = gate {
                let _permit = gate
                    .acquire()
                    .await
                    .map_err(|e| SourceError::Unavailable(e.to_string()))?;
                return self.inner.fetch(request).await;
            }
            self.inner.fetch(request).await
        })
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

/// Duplicated venues collapse into counted markers in key order.
#[tokio::test]
async fn test_search_aggregates_duplicate_venues() {
    let source = Arc::new(StaticEventSource::new(vec![
        event("a", "10.0", "20.0"),
        event("b", "10.0", "20.0"),
        event("c", "30.0", "40.0"),
    ]));
    let handle = SessionHandle::new(source, SessionConfig::default()).unwrap();

    let outcome = handle.search("", 0).await;
    assert_eq!(
        outcome,
        SearchOutcome::Loaded {
            page: 0,
            points: 2,
            dropped: 0
        }
    );

    let frame = handle.frame();
    let first = &frame.points()[0];
    assert_eq!((first.point.lng, first.point.lat), (20.0, 10.0));
    assert_eq!(first.occurrences, 2);
    assert_eq!(first.badge(), Some(2));

    let second = frame.markers.resolve(MarkerId(1)).unwrap();
    assert_eq!((second.point.lng, second.point.lat), (40.0, 30.0));
    assert_eq!(second.occurrences, 1);
    assert_eq!(frame.focus, Some(0));
}

/// Walk forward through three pages and back again.
#[tokio::test]
async fn test_paging_round_trip() {
    let mut records = events("gig", 45);
    records.extend(events("other", 3));
    let source = Arc::new(StaticEventSource::new(records));
    let handle = SessionHandle::new(Arc::clone(&source), SessionConfig::default()).unwrap();

    assert!(handle.search("gig", 0).await.is_success());
    assert!(matches!(
        handle.next_page().await,
        SearchOutcome::Loaded { page: 1, points: 20, .. }
    ));
    assert!(matches!(
        handle.next_page().await,
        SearchOutcome::Loaded { page: 2, points: 5, .. }
    ));

    // Short page: no probe issued
    let calls_before = source.calls();
    assert_eq!(handle.next_page().await, SearchOutcome::NoSuchPage);
    assert_eq!(source.calls(), calls_before);

    assert_eq!(
        handle.with_session(|s| s.pages().results_seen_total()),
        45
    );

    assert!(matches!(
        handle.previous_page().await,
        SearchOutcome::Loaded { page: 1, .. }
    ));
    assert!(matches!(
        handle.previous_page().await,
        SearchOutcome::Loaded { page: 0, .. }
    ));
    assert_eq!(handle.previous_page().await, SearchOutcome::NoSuchPage);

    // Back on page 0 the running count restarted
    assert_eq!(handle.with_session(|s| s.pages().results_seen_total()), 20);
    assert_eq!(handle.metrics().probes_issued, 2);
}

/// A slow search finishing after a newer one must not replace its markers.
#[tokio::test]
async fn test_superseded_search_is_discarded() {
    let mut records = events("slow", 4);
    records.push(event("fast", "-36.85", "174.76"));
    let source = Arc::new(GatedSource::new(records));
    let gate = source.gate("slow");
    let handle = SessionHandle::new(Arc::clone(&source), SessionConfig::default()).unwrap();

    let slow = tokio::spawn({
        let handle = handle.clone();
        async move { handle.search("slow", 0).await }
    });
    while source.issued() == 0 {
        tokio::task::yield_now().await;
    }
    assert_eq!(handle.state(), SessionState::Searching);

    let fast = handle.search("fast", 0).await;
    assert!(fast.is_success());

    gate.add_permits(1);
    let slow = slow.await.unwrap();
    assert_eq!(slow, SearchOutcome::Superseded);

    let frame = handle.frame();
    assert_eq!(frame.points().len(), 1);
    assert_eq!(frame.points()[0].lat_text, "-36.85");
    assert_eq!(handle.with_session(|s| s.query().to_string()), "fast");
    assert_eq!(handle.metrics().superseded_results, 1);
}

/// Asking for the next page while a new search is in flight must not load a
/// page of the old query over it.
#[tokio::test]
async fn test_next_page_during_new_search_keeps_new_query() {
    let mut records = events("alpha", 25);
    records.extend(events("beta", 3));
    let source = Arc::new(GatedSource::new(records));
    let handle = SessionHandle::new(Arc::clone(&source), SessionConfig::default()).unwrap();

    assert!(handle.search("alpha", 0).await.is_success());
    let gate = source.gate("beta");

    let pending = tokio::spawn({
        let handle = handle.clone();
        async move { handle.search("beta", 0).await }
    });
    while source.issued() < 2 {
        tokio::task::yield_now().await;
    }

    assert_eq!(handle.next_page().await, SearchOutcome::Superseded);
    assert_eq!(handle.previous_page().await, SearchOutcome::Superseded);
    assert_eq!(source.issued(), 2);

    gate.add_permits(1);
    assert_eq!(
        pending.await.unwrap(),
        SearchOutcome::Loaded {
            page: 0,
            points: 3,
            dropped: 0
        }
    );

    assert_eq!(handle.with_session(|s| s.query().to_string()), "beta");
    assert_eq!(handle.frame().points().len(), 3);
    assert_eq!(handle.metrics().probes_issued, 0);
}

/// Markers stay navigable while a search is in flight.
#[tokio::test]
async fn test_stepping_during_fetch_uses_current_list() {
    let mut records = events("first", 3);
    records.extend(events("second", 6));
    let source = Arc::new(GatedSource::new(records));
    let handle = SessionHandle::new(Arc::clone(&source), SessionConfig::default()).unwrap();

    handle.search("first", 0).await;
    let gate = source.gate("second");

    let pending = tokio::spawn({
        let handle = handle.clone();
        async move { handle.search("second", 0).await }
    });
    while source.issued() < 2 {
        tokio::task::yield_now().await;
    }

    assert_eq!(handle.step_next(), Some(1));
    assert_eq!(handle.step_next(), Some(2));
    assert_eq!(handle.step_next(), Some(0));

    gate.add_permits(1);
    assert!(pending.await.unwrap().is_success());

    let frame = handle.frame();
    assert_eq!(frame.points().len(), 6);
    assert_eq!(frame.focus, Some(0));
}

/// Clicks on ids from a superseded pass are ignored.
#[tokio::test]
async fn test_stale_click_after_new_search() {
    let mut records = events("many", 5);
    records.extend(events("few", 2));
    let source = Arc::new(StaticEventSource::new(records));
    let handle = SessionHandle::new(source, SessionConfig::default()).unwrap();

    handle.search("many", 0).await;
    assert_eq!(handle.resolve_click(MarkerId(4)), Some(4));

    handle.search("few", 0).await;
    assert_eq!(handle.resolve_click(MarkerId(4)), None);
    assert_eq!(handle.frame().focus, Some(0));
    assert_eq!(handle.resolve_click(MarkerId(1)), Some(1));
}

/// Subscribers see every visible change.
#[tokio::test]
async fn test_render_frames_track_session() {
    let source = Arc::new(StaticEventSource::new(events("show", 3)));
    let handle = SessionHandle::new(source, SessionConfig::default()).unwrap();
    let mut frames = handle.subscribe();

    let watcher = tokio::spawn(async move {
        frames.changed().await.unwrap();
        let frame = frames.borrow_and_update().clone();
        (frame.points().len(), frame.focus)
    });

    handle.search("show", 0).await;
    assert_eq!(watcher.await.unwrap(), (3, Some(0)));
}

/// Malformed coordinates are dropped without failing the search.
#[tokio::test]
async fn test_bad_coordinates_are_counted() {
    let source = Arc::new(StaticEventSource::new(vec![
        event("ok", "-41.28", "174.77"),
        event("typo", "-41,28", "174.77"),
        RawEventRecord::new().with_field("name", "online only"),
    ]));
    let handle = SessionHandle::new(source, SessionConfig::default()).unwrap();

    let outcome = handle.search("", 0).await;

    assert_eq!(
        outcome,
        SearchOutcome::Loaded {
            page: 0,
            points: 1,
            dropped: 2
        }
    );
    assert_eq!(handle.metrics().records_dropped, 2);
}
