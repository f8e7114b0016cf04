//! Event source backed by a JSON file on disk.
//!
//! Accepts either a top-level array of event objects or an object with an
//! `events` array. Scalar field values are kept as text. Numbers are
//! re-rendered by `serde_json`, so coordinates whose exact spelling matters
//! should be written as strings. Nested values and nulls are skipped.

use std::path::{Path, PathBuf};

use eventures::source::{
    BoxFuture, EventSource, FetchRequest, RawEventRecord, SourceError, StaticEventSource,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CliError;

/// [`EventSource`] serving the events of one JSON file.
#[derive(Debug)]
pub struct JsonFileEventSource {
    path: PathBuf,
    inner: StaticEventSource,
}

impl JsonFileEventSource {
    /// Read and parse `path`.
    pub fn open(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records = parse_events(&text).map_err(|source| CliError::Events {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), events = records.len(), "Loaded events file");

        Ok(Self {
            path: path.to_path_buf(),
            inner: StaticEventSource::new(records),
        })
    }

    /// File the events were read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of events in the file.
    pub fn event_count(&self) -> usize {
        self.inner.len()
    }

    /// Number of fetches served so far.
    pub fn calls(&self) -> usize {
        self.inner.calls()
    }
}

impl EventSource for JsonFileEventSource {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<Vec<RawEventRecord>, SourceError>> {
        self.inner.fetch(request)
    }
}

/// Parse event records from JSON text.
pub fn parse_events(text: &str) -> Result<Vec<RawEventRecord>, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("events") {
            Some(Value::Array(items)) => items,
            _ => {
                warn!("Events file has no `events` array");
                Vec::new()
            }
        },
        _ => {
            warn!("Events file is neither an array nor an object");
            Vec::new()
        }
    };

    let mut skipped = 0usize;
    let records: Vec<RawEventRecord> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(fields) => Some(
                fields
                    .into_iter()
                    .filter_map(|(name, value)| scalar_text(value).map(|text| (name, text)))
                    .collect(),
            ),
            _ => {
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        warn!(skipped, "Skipped non-object entries in events file");
    }

    Ok(records)
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
