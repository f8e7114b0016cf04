//! In-memory event source.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::types::{BoxFuture, EventSource, FetchRequest, RawEventRecord, SourceError};

/// Event source backed by a fixed list of records.
///
/// Applies the query as a case-insensitive substring match over every field
/// value, then slices the matches by `offset`/`limit`. Used by the CLI for
/// file-backed data and by tests as a scriptable stand-in for the remote API.
#[derive(Debug, Default)]
pub struct StaticEventSource {
    records: Vec<RawEventRecord>,
    failure: Mutex<Option<SourceError>>,
    requests: Mutex<Vec<FetchRequest>>,
    calls: AtomicUsize,
}

impl StaticEventSource {
    /// Create a source serving `records`.
    pub fn new(records: Vec<RawEventRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    /// Make every following fetch fail with `error`, or succeed again with `None`.
    pub fn set_failure(&self, error: Option<SourceError>) {
        *self.failure.lock() = error;
    }

    /// Number of fetches issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// All requests received so far, oldest first.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }

    /// Total number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the source holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn select(&self, request: &FetchRequest) -> Vec<RawEventRecord> {
        let needle = request.query.to_lowercase();
        self.records
            .iter()
            .filter(|record| {
                needle.is_empty()
                    || record
                        .fields()
                        .any(|(_, value)| value.to_lowercase().contains(&needle))
            })
            .filter(|record| {
                request
                    .filters
                    .iter()
                    .all(|(name, value)| record.get(name) == Some(value.as_str()))
            })
            .skip(request.offset)
            .take(request.limit)
            .cloned()
            .collect()
    }
}

impl EventSource for StaticEventSource {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<Vec<RawEventRecord>, SourceError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.requests.lock().push(request.clone());

            if let Some(error) = self.failure.lock().clone() {
                return Err(error);
            }
            Ok(self.select(&request))
        })
    }
}
