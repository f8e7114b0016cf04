//! Point-in-time copy of session counters.

use std::fmt;

/// Session counters at one moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub searches_started: u64,
    pub searches_loaded: u64,
    pub empty_results: u64,
    pub source_failures: u64,
    pub superseded_results: u64,
    pub records_fetched: u64,
    pub records_dropped: u64,
    pub probes_issued: u64,
}

impl MetricsSnapshot {
    /// Fraction of fetched records that were dropped, 0.0 when nothing was fetched.
    pub fn drop_rate(&self) -> f64 {
        if self.records_fetched == 0 {
            0.0
        } else {
            self.records_dropped as f64 / self.records_fetched as f64
        }
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "searches: {} started, {} loaded, {} empty, {} failed, {} superseded; \
             records: {} fetched, {} dropped; probes: {}",
            self.searches_started,
            self.searches_loaded,
            self.empty_results,
            self.source_failures,
            self.superseded_results,
            self.records_fetched,
            self.records_dropped,
            self.probes_issued
        )
    }
}
