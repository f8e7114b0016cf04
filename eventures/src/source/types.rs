//! Core types for the event source boundary.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field holding the latitude of an event, in decimal degrees.
pub const LAT_FIELD: &str = "lat";

/// Field holding the longitude of an event, in decimal degrees.
pub const LNG_FIELD: &str = "lng";

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One event as returned by the directory API.
///
/// The record is an opaque map of string fields. Only `lat` and `lng` are read
/// by the core; everything else is carried through untouched for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEventRecord {
    fields: BTreeMap<String, String>,
}

impl RawEventRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record holding only a coordinate pair.
    pub fn at(lat: impl Into<String>, lng: impl Into<String>) -> Self {
        Self::new().with_field(LAT_FIELD, lat).with_field(LNG_FIELD, lng)
    }

    /// Set a field, replacing any previous value.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Raw latitude text, if present.
    pub fn lat(&self) -> Option<&str> {
        self.get(LAT_FIELD)
    }

    /// Raw longitude text, if present.
    pub fn lng(&self) -> Option<&str> {
        self.get(LNG_FIELD)
    }

    /// Iterate over all fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for RawEventRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parameters of a single fetch against the event source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    /// Free-text search query. Empty matches everything.
    pub query: String,

    /// Additional filter fields, opaque to the core.
    pub filters: BTreeMap<String, String>,

    /// Maximum number of records to return.
    pub limit: usize,

    /// Number of records to skip.
    pub offset: usize,

    /// Ask the source to match the query exactly rather than loosely.
    pub exact_page: bool,
}

impl FetchRequest {
    /// Request page `page` of `page_size` records for `query`.
    pub fn page(query: impl Into<String>, page: u32, page_size: usize) -> Self {
        Self {
            query: query.into(),
            limit: page_size,
            offset: page as usize * page_size,
            ..Default::default()
        }
    }

    /// Set the filter fields.
    pub fn with_filters(mut self, filters: BTreeMap<String, String>) -> Self {
        self.filters = filters;
        self
    }

    /// Set exact-page matching.
    pub fn with_exact_page(mut self, exact_page: bool) -> Self {
        self.exact_page = exact_page;
        self
    }
}

/// Errors raised by an event source.
///
/// Both variants mean the same thing to the session: the source is not
/// available right now and the last good result stays on screen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The source rejected or failed the request.
    #[error("event source unavailable: {0}")]
    Unavailable(String),

    /// The source did not answer in time.
    #[error("event source timed out after {0:?}")]
    Timeout(Duration),
}

/// Supplier of raw event records.
///
/// Implementations must be `Send + Sync` so a session can share them across
/// tasks. The method returns a boxed future to keep the trait usable as
/// `Arc<dyn EventSource>`.
pub trait EventSource: Send + Sync {
    /// Fetch one page of records.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the source cannot be reached or fails the
    /// request.
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<Vec<RawEventRecord>, SourceError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_at_sets_coordinates() {
        let record = RawEventRecord::at("10.0", "20.0");
        assert_eq!(record.lat(), Some("10.0"));
        assert_eq!(record.lng(), Some("20.0"));
        assert_eq!(record.get("name"), None);
    }

    #[test]
    fn test_record_deserializes_from_flat_json_object() {
        let json = r#"{"name": "Jazz Night", "lat": "-41.28", "lng": "174.77"}"#;
        let record: RawEventRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.get("name"), Some("Jazz Night"));
        assert_eq!(record.lat(), Some("-41.28"));
        assert_eq!(record.lng(), Some("174.77"));
    }

    #[test]
    fn test_record_from_iterator() {
        let record: RawEventRecord = [("lat", "1"), ("lng", "2"), ("venue", "Hall")]
            .into_iter()
            .collect();
        let names: Vec<&str> = record.fields().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["lat", "lng", "venue"]);
    }

    #[test]
    fn test_fetch_request_page_offset() {
        let request = FetchRequest::page("music", 3, 20);
        assert_eq!(request.limit, 20);
        assert_eq!(request.offset, 60);
        assert!(!request.exact_page);
    }

    #[test]
    fn test_source_error_display() {
        let err = SourceError::Unavailable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));

        let err = SourceError::Timeout(Duration::from_secs(5));
        assert!(err.to_string().contains("timed out"));
    }
}
