//! Marker id registry.
//!
//! Each aggregation pass hands out dense ids `0..N` in point-list order. The
//! renderer tags every drawn marker with its id; a click comes back as that id
//! and is resolved here to the aggregated point.
//!
//! Ids are only meaningful for the pass that issued them. After the next pass
//! an old id either points at whatever now sits at that position or, if the
//! new list is shorter, resolves to [`MarkerError::NotFound`].

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::aggregate::{AggregatedPoint, PointList};

/// Dense marker index within one aggregation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u32);

impl MarkerId {
    /// Position of the marker in the point list.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors from marker lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MarkerError {
    /// The id was not issued by the current pass.
    #[error("marker {0} not found")]
    NotFound(MarkerId),
}

/// Mapping from marker id to aggregated point for the current pass.
///
/// Read-only once assigned. Cloning is cheap: the point list is shared, so
/// the session can hand copies to the renderer and replace its own wholesale
/// on the next pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerRegistry {
    points: Arc<PointList>,
    pass: u64,
}

impl MarkerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign ids to `points`, replacing every id from the previous pass.
    pub fn assign_ids(&mut self, points: Arc<PointList>) {
        self.points = points;
        self.pass += 1;
    }

    /// Points of the current pass, indexed by marker id.
    pub fn points(&self) -> &PointList {
        &self.points
    }

    /// Resolve `id` to its point.
    pub fn resolve(&self, id: MarkerId) -> Result<&AggregatedPoint, MarkerError> {
        self.points.get(id.index()).ok_or(MarkerError::NotFound(id))
    }

    /// All ids of the current pass with their points, in order.
    pub fn entries(&self) -> impl Iterator<Item = (MarkerId, &AggregatedPoint)> {
        self.points
            .iter()
            .enumerate()
            .map(|(index, point)| (MarkerId(index as u32), point))
    }

    /// Number of ids issued by the current pass.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the current pass issued no ids.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of passes so far. Starts at 0 before the first assignment.
    pub fn pass(&self) -> u64 {
        self.pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::source::RawEventRecord;

    fn points(coords: &[(&str, &str)]) -> Arc<PointList> {
        let records: Vec<RawEventRecord> = coords
            .iter()
            .map(|(lat, lng)| RawEventRecord::at(*lat, *lng))
            .collect();
        Arc::new(aggregate(&records).points)
    }

    #[test]
    fn test_ids_follow_list_order() {
        let list = points(&[("10.0", "20.0"), ("10.0", "20.0"), ("30.0", "40.0")]);
        let mut registry = MarkerRegistry::new();
        registry.assign_ids(Arc::clone(&list));

        assert_eq!(registry.resolve(MarkerId(0)).unwrap().occurrences, 2);
        assert_eq!(registry.resolve(MarkerId(1)).unwrap().lat_text, "30.0");
        assert_eq!(
            registry.resolve(MarkerId(2)),
            Err(MarkerError::NotFound(MarkerId(2)))
        );
    }

    #[test]
    fn test_every_id_resolves_to_its_position() {
        let list = points(&[("1", "1"), ("2", "2"), ("3", "3"), ("4", "4")]);
        let mut registry = MarkerRegistry::new();
        registry.assign_ids(Arc::clone(&list));

        for (id, point) in registry.entries() {
            assert_eq!(registry.resolve(id), Ok(&list[id.index()]));
            assert_eq!(point, &list[id.index()]);
        }
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_new_pass_invalidates_old_ids() {
        let mut registry = MarkerRegistry::new();
        registry.assign_ids(points(&[("1", "1"), ("2", "2"), ("3", "3")]));
        assert_eq!(registry.pass(), 1);

        registry.assign_ids(points(&[("9", "9")]));
        assert_eq!(registry.pass(), 2);

        assert_eq!(registry.resolve(MarkerId(0)).unwrap().lat_text, "9");
        assert!(registry.resolve(MarkerId(1)).is_err());
        assert!(registry.resolve(MarkerId(2)).is_err());
    }

    #[test]
    fn test_empty_pass_clears_registry() {
        let mut registry = MarkerRegistry::new();
        registry.assign_ids(points(&[("1", "1")]));
        registry.assign_ids(Arc::default());

        assert!(registry.is_empty());
        assert!(registry.resolve(MarkerId(0)).is_err());
    }

    #[test]
    fn test_marker_id_display() {
        assert_eq!(MarkerId(4).to_string(), "#4");
        assert_eq!(
            MarkerError::NotFound(MarkerId(4)).to_string(),
            "marker #4 not found"
        );
    }
}
