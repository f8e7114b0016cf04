//! Event source abstraction
//!
//! The core never talks to the remote events directory directly. Everything it
//! needs comes through the [`EventSource`] trait: one call that returns a page
//! of raw event records for a query.
//!
//! # Boundary
//!
//! ```text
//! MapSession ──► FetchRequest ──► EventSource ──► Vec<RawEventRecord>
//!                (query, filters,   (HTTP, file,     (opaque string maps,
//!                 limit, offset)     in-memory...)     only lat/lng read)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use eventures::source::{EventSource, FetchRequest, StaticEventSource};
//!
//! let source = StaticEventSource::new(records);
//! let page = source.fetch(FetchRequest::page("jazz", 0, 20)).await?;
//! ```

mod memory;
mod types;

pub use memory::StaticEventSource;
pub use types::{
    BoxFuture, EventSource, FetchRequest, RawEventRecord, SourceError, LAT_FIELD, LNG_FIELD,
};
