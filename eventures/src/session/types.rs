//! Session state, outcomes and render frames.

use std::fmt;

use crate::aggregate::{AggregatedPoint, PointList};
use crate::markers::MarkerRegistry;
use crate::source::{FetchRequest, SourceError};

/// Lifecycle of a map session.
///
/// ```text
/// Idle ──search──► Searching ──► Loaded ──search(page 0)──► Searching ──► Loaded
///                                  │
///                                  └──search(page > 0)──► Paging ──► Loaded
/// ```
///
/// A failed fetch returns to whichever of `Idle` or `Loaded` the session was
/// in before the fetch began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No point list has been loaded yet.
    Idle,
    /// A point list is on display.
    Loaded,
    /// A new search (page 0) is in flight.
    Searching,
    /// A further page of the current search is in flight.
    Paging,
}

impl SessionState {
    /// Whether a fetch is outstanding.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::Searching | SessionState::Paging)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Loaded => write!(f, "loaded"),
            SessionState::Searching => write!(f, "searching"),
            SessionState::Paging => write!(f, "paging"),
        }
    }
}

/// Handle for one outstanding fetch.
///
/// Issued by [`MapSession::begin_search`](super::MapSession::begin_search)
/// and handed back with the result. The generation decides whether the result
/// is still wanted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    /// Generation of the search that issued the fetch.
    pub generation: u64,
    /// Page requested.
    pub page: u32,
    /// Request to send to the event source.
    pub request: FetchRequest,
}

/// What a search, page load or page probe did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A new point list is on display with the first point focused.
    Loaded {
        page: u32,
        points: usize,
        dropped: usize,
    },
    /// The page held no usable points; the display is now empty.
    Empty { page: u32, dropped: usize },
    /// The source failed; the previous display is unchanged.
    Unavailable(SourceError),
    /// A newer search was issued while this one was in flight; its result was discarded.
    Superseded,
    /// The requested neighbouring page does not exist.
    NoSuchPage,
}

impl SearchOutcome {
    /// Whether the display now reflects the requested page.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            SearchOutcome::Loaded { .. } | SearchOutcome::Empty { .. }
        )
    }
}

/// Everything the renderer needs to draw one state of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderFrame {
    /// Generation of the search that produced the points.
    pub generation: u64,
    /// Marker ids and their points.
    pub markers: MarkerRegistry,
    /// Index of the focused point.
    pub focus: Option<usize>,
}

impl RenderFrame {
    /// Points to draw, in marker id order.
    pub fn points(&self) -> &PointList {
        self.markers.points()
    }

    /// The focused point, if any.
    pub fn focus_point(&self) -> Option<&AggregatedPoint> {
        self.focus.and_then(|index| self.points().get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_success_flag() {
        assert!(SearchOutcome::Loaded {
            page: 0,
            points: 3,
            dropped: 0
        }
        .is_success());
        assert!(SearchOutcome::Empty {
            page: 0,
            dropped: 0
        }
        .is_success());
        assert!(!SearchOutcome::Superseded.is_success());
        assert!(!SearchOutcome::NoSuchPage.is_success());
        assert!(
            !SearchOutcome::Unavailable(SourceError::Unavailable("x".to_string())).is_success()
        );
    }

    #[test]
    fn test_busy_states() {
        assert!(SessionState::Searching.is_busy());
        assert!(SessionState::Paging.is_busy());
        assert!(!SessionState::Idle.is_busy());
        assert!(!SessionState::Loaded.is_busy());
    }

    #[test]
    fn test_empty_frame_has_no_focus_point() {
        let frame = RenderFrame::default();
        assert!(frame.points().is_empty());
        assert!(frame.focus_point().is_none());
    }
}
