//! Cyclic cursor over the displayed markers.
//!
//! Stepping past either end wraps around, so "next" on the last marker goes
//! back to the first and "previous" on the first goes to the last.

/// Index of the focused point, or `None` when there are no points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationCursor {
    current: Option<usize>,
}

impl NavigationCursor {
    /// Create a cursor with nothing focused.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently focused index.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Reset for a freshly built list of `len` points.
    ///
    /// Focuses the first point, or nothing for an empty list.
    pub fn reset(&mut self, len: usize) -> Option<usize> {
        self.current = (len > 0).then_some(0);
        self.current
    }

    /// Step forward, wrapping from `len - 1` to `0`.
    pub fn next(&mut self, len: usize) -> Option<usize> {
        self.current = next_index(len, self.current);
        self.current
    }

    /// Step backward, wrapping from `0` to `len - 1`.
    pub fn previous(&mut self, len: usize) -> Option<usize> {
        self.current = previous_index(len, self.current);
        self.current
    }

    /// Focus `index` directly. Out-of-range indices leave the cursor unchanged.
    pub fn set(&mut self, index: usize, len: usize) -> Option<usize> {
        if index < len {
            self.current = Some(index);
        }
        self.current
    }
}

/// Index after `current` in a cyclic list of `len` items.
pub fn next_index(len: usize, current: Option<usize>) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match current {
        Some(index) if index + 1 < len => Some(index + 1),
        Some(_) => Some(0),
        None => Some(0),
    }
}

/// Index before `current` in a cyclic list of `len` items.
pub fn previous_index(len: usize, current: Option<usize>) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match current {
        Some(index) if index > 0 && index < len => Some(index - 1),
        Some(_) => Some(len - 1),
        None => Some(0),
    }
}
