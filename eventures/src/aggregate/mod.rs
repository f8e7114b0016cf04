//! Coordinate aggregation
//!
//! Turns a raw, possibly duplicated list of event records into unique map
//! points with occurrence counts. Several events at the same venue become one
//! marker with a count badge instead of a stack of overlapping markers.
//!
//! # Keying
//!
//! Records are grouped by the exact `(lat, lng)` text, not by parsed value.
//! `"10.00"` and `"10.0"` are different points. Grouping happens first and
//! parsing second, so a malformed key drops every record that carries it.
//!
//! # Example
//!
//! ```
//! use eventures::aggregate::aggregate;
//! use eventures::source::RawEventRecord;
//!
//! let records = vec![
//!     RawEventRecord::at("10.0", "20.0"),
//!     RawEventRecord::at("10.0", "20.0"),
//!     RawEventRecord::at("30.0", "40.0"),
//! ];
//! let result = aggregate(&records);
//! assert_eq!(result.points.len(), 2);
//! assert_eq!(result.points[0].occurrences, 2);
//! ```

mod types;

pub use types::{
    parse_degrees, AggregatedPoint, Aggregation, CoordField, CoordinateError, GeoPoint, PointList,
    MAX_LAT, MAX_LNG, MIN_LAT, MIN_LNG,
};

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::source::RawEventRecord;

/// Aggregate raw records into unique points.
///
/// Records with a missing or unparsable coordinate are dropped and counted in
/// [`Aggregation::dropped_records`]; the rest of the pass continues.
pub fn aggregate(records: &[RawEventRecord]) -> Aggregation {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    let mut dropped_records = 0;

    for record in records {
        match (record.lat(), record.lng()) {
            (Some(lat), Some(lng)) => *counts.entry((lat, lng)).or_insert(0) += 1,
            (lat, _) => {
                let field = if lat.is_none() {
                    CoordField::Lat
                } else {
                    CoordField::Lng
                };
                warn!(error = %CoordinateError::Missing(field), "Dropping event record");
                dropped_records += 1;
            }
        }
    }

    let mut points = Vec::with_capacity(counts.len());
    for ((lat_text, lng_text), occurrences) in counts {
        match parse_pair(lat_text, lng_text) {
            Ok(point) => points.push(AggregatedPoint {
                point,
                occurrences,
                lat_text: lat_text.to_string(),
                lng_text: lng_text.to_string(),
            }),
            Err(e) => {
                warn!(error = %e, records = occurrences, "Dropping event records");
                dropped_records += occurrences;
            }
        }
    }

    debug!(
        records = records.len(),
        points = points.len(),
        dropped = dropped_records,
        "Aggregated event records"
    );

    Aggregation {
        points: PointList::from_sorted(points),
        dropped_records,
    }
}

fn parse_pair(lat: &str, lng: &str) -> Result<GeoPoint, CoordinateError> {
    let lat = parse_degrees(CoordField::Lat, lat)?;
    let lng = parse_degrees(CoordField::Lng, lng)?;
    Ok(GeoPoint::new(lng, lat))
}
