//! Atomic counters for a map session.

use std::sync::atomic::{AtomicU64, Ordering};

use super::snapshot::MetricsSnapshot;

/// Counters describing what a session has done so far.
///
/// All methods take `&self`; share through `Arc<SessionMetrics>`.
#[derive(Debug, Default)]
pub struct SessionMetrics {
    searches_started: AtomicU64,
    searches_loaded: AtomicU64,
    empty_results: AtomicU64,
    source_failures: AtomicU64,
    superseded_results: AtomicU64,
    records_fetched: AtomicU64,
    records_dropped: AtomicU64,
    probes_issued: AtomicU64,
}

impl SessionMetrics {
    /// Create a zeroed set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// A search or page load was issued.
    pub fn search_started(&self) {
        self.searches_started.fetch_add(1, Ordering::Relaxed);
    }

    /// A search produced a non-empty point list.
    pub fn search_loaded(&self) {
        self.searches_loaded.fetch_add(1, Ordering::Relaxed);
    }

    /// A search returned no usable points.
    pub fn empty_result(&self) {
        self.empty_results.fetch_add(1, Ordering::Relaxed);
    }

    /// The event source failed or timed out.
    pub fn source_failure(&self) {
        self.source_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A result arrived after a newer search had been issued.
    pub fn result_superseded(&self) {
        self.superseded_results.fetch_add(1, Ordering::Relaxed);
    }

    /// Records received from the source and how many of them were dropped.
    pub fn records_fetched(&self, fetched: usize, dropped: usize) {
        self.records_fetched
            .fetch_add(fetched as u64, Ordering::Relaxed);
        self.records_dropped
            .fetch_add(dropped as u64, Ordering::Relaxed);
    }

    /// A next-page probe was sent to the source.
    pub fn probe_issued(&self) {
        self.probes_issued.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            searches_started: self.searches_started.load(Ordering::Relaxed),
            searches_loaded: self.searches_loaded.load(Ordering::Relaxed),
            empty_results: self.empty_results.load(Ordering::Relaxed),
            source_failures: self.source_failures.load(Ordering::Relaxed),
            superseded_results: self.superseded_results.load(Ordering::Relaxed),
            records_fetched: self.records_fetched.load(Ordering::Relaxed),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
            probes_issued: self.probes_issued.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counters_start_at_zero() {
        let snapshot = SessionMetrics::new().snapshot();
        assert_eq!(snapshot, MetricsSnapshot::default());
    }

    #[test]
    fn test_records_fetched_accumulates() {
        let metrics = SessionMetrics::new();
        metrics.records_fetched(20, 1);
        metrics.records_fetched(5, 0);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.records_fetched, 25);
        assert_eq!(snapshot.records_dropped, 1);
    }

    #[test]
    fn test_concurrent_updates() {
        let metrics = Arc::new(SessionMetrics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        metrics.search_started();
                        metrics.probe_issued();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.searches_started, 400);
        assert_eq!(snapshot.probes_issued, 400);
    }
}
