//! Session telemetry for observability and diagnostics.
//!
//! Lock-free atomic counters updated by the session as searches run, copied
//! out as a plain snapshot for display.
//!
//! # Architecture
//!
//! ```text
//! MapSession ─────► SessionMetrics ─────► MetricsSnapshot ─────► Views
//!                   (atomic counters)     (point-in-time copy)    (CLI, logs)
//! ```
//!
//! # Example
//!
//! ```
//! use eventures::telemetry::SessionMetrics;
//!
//! let metrics = SessionMetrics::new();
//! metrics.search_started();
//! metrics.records_fetched(20, 2);
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.records_dropped, 2);
//! ```

mod metrics;
mod snapshot;

pub use metrics::SessionMetrics;
pub use snapshot::MetricsSnapshot;
