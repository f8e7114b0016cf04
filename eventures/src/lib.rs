//! Eventures - geocoded events as navigable map markers
//!
//! This library is the data layer behind an event map. It takes pages of raw
//! event records from a remote directory, collapses events that share a
//! location into single markers with counts, hands out marker ids for click
//! resolution, cycles a focus cursor through the markers, and works out
//! whether neighbouring result pages exist.
//!
//! Rendering, camera motion and the HTTP details of the directory API live
//! outside this crate. The [`source::EventSource`] trait is the only way data
//! comes in; [`session::RenderFrame`]s are the only thing that goes out.
//!
//! # Modules
//!
//! - [`source`] - event source boundary and an in-memory implementation
//! - [`aggregate`] - exact-coordinate deduplication with occurrence counts
//! - [`paging`] - page bookkeeping and next-page probing
//! - [`navigation`] - cyclic focus cursor
//! - [`markers`] - marker id assignment and reverse lookup
//! - [`session`] - orchestration, generations and render frames
//! - [`telemetry`] - session counters
//! - [`logging`] - subscriber bootstrap

pub mod aggregate;
pub mod logging;
pub mod markers;
pub mod navigation;
pub mod paging;
pub mod session;
pub mod source;
pub mod telemetry;
