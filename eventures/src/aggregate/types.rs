//! Point and coordinate types produced by aggregation.

use std::fmt;
use std::ops::Index;

use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;
/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;
/// Minimum valid longitude in degrees.
pub const MIN_LNG: f64 = -180.0;
/// Maximum valid longitude in degrees.
pub const MAX_LNG: f64 = 180.0;

/// Which half of a coordinate pair an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordField {
    Lat,
    Lng,
}

impl fmt::Display for CoordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordField::Lat => write!(f, "lat"),
            CoordField::Lng => write!(f, "lng"),
        }
    }
}

/// A raw coordinate that cannot be turned into a map point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    /// The record has no value for the field.
    #[error("missing {0} field")]
    Missing(CoordField),

    /// The text is not a finite decimal number.
    #[error("malformed {field} coordinate: {value:?}")]
    Malformed { field: CoordField, value: String },

    /// The number lies outside the WGS84 range for the field.
    #[error("{field} coordinate {value} outside WGS84 range")]
    OutOfRange { field: CoordField, value: f64 },
}

/// Parse one decimal-degree string.
///
/// Accepts anything `f64::from_str` accepts except non-finite values, then
/// checks the WGS84 range for `field`.
pub fn parse_degrees(field: CoordField, text: &str) -> Result<f64, CoordinateError> {
    let value: f64 = text.parse().map_err(|_| CoordinateError::Malformed {
        field,
        value: text.to_string(),
    })?;

    if !value.is_finite() {
        return Err(CoordinateError::Malformed {
            field,
            value: text.to_string(),
        });
    }

    let (min, max) = match field {
        CoordField::Lat => (MIN_LAT, MAX_LAT),
        CoordField::Lng => (MIN_LNG, MAX_LNG),
    };
    if !(min..=max).contains(&value) {
        return Err(CoordinateError::OutOfRange { field, value });
    }

    Ok(value)
}

/// A WGS84 position, stored longitude first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Longitude in degrees (-180.0 to 180.0)
    pub lng: f64,
    /// Latitude in degrees (-90.0 to 90.0)
    pub lat: f64,
}

impl GeoPoint {
    /// Create a point from longitude and latitude.
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lng, self.lat)
    }
}

/// A unique coordinate and the number of events found there.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedPoint {
    /// Parsed position.
    pub point: GeoPoint,
    /// Number of raw records sharing this exact coordinate text. Always >= 1.
    pub occurrences: usize,
    /// Latitude text the point was keyed on.
    pub lat_text: String,
    /// Longitude text the point was keyed on.
    pub lng_text: String,
}

impl AggregatedPoint {
    /// Count badge to draw next to the marker.
    ///
    /// Single events get no badge.
    pub fn badge(&self) -> Option<usize> {
        (self.occurrences > 1).then_some(self.occurrences)
    }
}

/// Aggregated points in ascending `(lat text, lng text)` order.
///
/// The order is what makes marker ids reproducible: the same multiset of
/// records always yields the same list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointList {
    points: Vec<AggregatedPoint>,
}

impl PointList {
    pub(crate) fn from_sorted(points: Vec<AggregatedPoint>) -> Self {
        Self { points }
    }

    /// Number of unique points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&AggregatedPoint> {
        self.points.get(index)
    }

    /// Iterate in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, AggregatedPoint> {
        self.points.iter()
    }

    /// Sum of occurrences over all points.
    pub fn total_occurrences(&self) -> usize {
        self.points.iter().map(|p| p.occurrences).sum()
    }

    /// Borrow as a slice.
    pub fn as_slice(&self) -> &[AggregatedPoint] {
        &self.points
    }
}

impl Index<usize> for PointList {
    type Output = AggregatedPoint;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<'a> IntoIterator for &'a PointList {
    type Item = &'a AggregatedPoint;
    type IntoIter = std::slice::Iter<'a, AggregatedPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// Unique points in display order.
    pub points: PointList,
    /// Records dropped because their coordinates could not be parsed.
    pub dropped_records: usize,
}

impl Aggregation {
    /// Number of records that made it into the point list.
    pub fn accepted_records(&self) -> usize {
        self.points.total_occurrences()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_degrees() {
        assert_eq!(parse_degrees(CoordField::Lat, "-41.2865"), Ok(-41.2865));
        assert_eq!(parse_degrees(CoordField::Lng, "174.7762"), Ok(174.7762));
        assert_eq!(parse_degrees(CoordField::Lat, "90"), Ok(90.0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_degrees(CoordField::Lat, "ten").unwrap_err();
        assert!(matches!(
            err,
            CoordinateError::Malformed {
                field: CoordField::Lat,
                ..
            }
        ));
        assert!(parse_degrees(CoordField::Lng, "").is_err());
        assert!(parse_degrees(CoordField::Lng, "10.0abc").is_err());
    }

    #[test]
    fn test_parse_rejects_non_finite() {
        assert!(parse_degrees(CoordField::Lat, "NaN").is_err());
        assert!(parse_degrees(CoordField::Lng, "inf").is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        let err = parse_degrees(CoordField::Lat, "91.5").unwrap_err();
        assert_eq!(
            err,
            CoordinateError::OutOfRange {
                field: CoordField::Lat,
                value: 91.5
            }
        );
        assert!(parse_degrees(CoordField::Lng, "-180.01").is_err());
        assert!(parse_degrees(CoordField::Lng, "180").is_ok());
    }

    #[test]
    fn test_badge_only_for_repeated_points() {
        let mut point = AggregatedPoint {
            point: GeoPoint::new(20.0, 10.0),
            occurrences: 1,
            lat_text: "10.0".to_string(),
            lng_text: "20.0".to_string(),
        };
        assert_eq!(point.badge(), None);

        point.occurrences = 3;
        assert_eq!(point.badge(), Some(3));
    }

    #[test]
    fn test_error_display_names_field() {
        let err = CoordinateError::Missing(CoordField::Lng);
        assert_eq!(err.to_string(), "missing lng field");
    }
}
