//! Map session orchestration
//!
//! Composes aggregation, marker ids, navigation and paging into the state
//! the rendering layer draws from.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        SessionHandle                          │
//! │   search / next_page / previous_page  (async, await source)  │
//! │                              │                                │
//! │             ┌────────────────▼───────────────┐                │
//! │             │     Mutex<MapSession>          │                │
//! │             │  PageCursor   NavigationCursor │                │
//! │             │  MarkerRegistry  generation    │                │
//! │             └────────────────┬───────────────┘                │
//! │                              │ watch::Sender<RenderFrame>     │
//! └──────────────────────────────┼────────────────────────────────┘
//!                                ▼
//!                            renderer
//! ```
//!
//! The lock is never held across an `.await`. Results are tagged with the
//! generation of the search that asked for them and dropped if a newer search
//! has started since.

mod config;
mod machine;
mod handle;
mod types;

pub use machine::MapSession;
pub use config::{ConfigError, SessionConfig, DEFAULT_FETCH_TIMEOUT_SECS};
pub use handle::SessionHandle;
pub use types::{FetchTicket, RenderFrame, SearchOutcome, SessionState};
