//! Map viewpoint helpers.
//!
//! A viewpoint is a map centre plus a scale denominator (1:scale). The
//! session only reports which point has focus; these helpers turn that into
//! the viewpoint a map view would move to.

use std::fmt;

use eventures::aggregate::GeoPoint;

/// Longitude of the initial centre.
pub const INITIAL_CENTER_LNG: f64 = 173.072_753_771_153_86;

/// Latitude of the initial centre.
pub const INITIAL_CENTER_LAT: f64 = -41.352_498_070_153_49;

/// Scale of the initial country-wide view.
pub const INITIAL_SCALE: f64 = 12_000_000.0;

/// Scale used when focusing a single point.
pub const FOCUS_SCALE: f64 = 100_000.0;

/// Scale factor applied by one zoom-in step.
pub const ZOOM_IN_FACTOR: f64 = 0.8;

/// Scale factor applied by one zoom-out step.
pub const ZOOM_OUT_FACTOR: f64 = 1.2;

/// Where the map is looking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    pub center: GeoPoint,
    pub scale: f64,
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self::initial()
    }
}

impl Viewpoint {
    /// The view shown before any search.
    pub fn initial() -> Self {
        Self {
            center: GeoPoint::new(INITIAL_CENTER_LNG, INITIAL_CENTER_LAT),
            scale: INITIAL_SCALE,
        }
    }

    /// Close-up view of `point`.
    pub fn focused_on(point: GeoPoint) -> Self {
        Self {
            center: point,
            scale: FOCUS_SCALE,
        }
    }

    /// Zoom in one step around the same centre.
    pub fn zoom_in(self) -> Self {
        Self {
            scale: self.scale * ZOOM_IN_FACTOR,
            ..self
        }
    }

    /// Zoom out one step around the same centre.
    pub fn zoom_out(self) -> Self {
        Self {
            scale: self.scale * ZOOM_OUT_FACTOR,
            ..self
        }
    }
}

impl fmt::Display for Viewpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at 1:{:.0}", self.center, self.scale)
    }
}
