//! Great-circle distance on a spherical Earth.
//!
//! Every distance threshold in the crate (catchment radius, max hop) is
//! compared against this formula, so nothing else should compute distances.

use serde::{Deserialize, Serialize};

use crate::error::{BeaconError, Result};

/// Sphere radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Checks that both components are finite and inside the WGS84 ranges.
    pub fn validate(self) -> Result<Self> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(BeaconError::Validation(format!(
                "latitude {} outside [-90, 90]",
                self.lat
            )));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(BeaconError::Validation(format!(
                "longitude {} outside [-180, 180]",
                self.lng
            )));
        }
        Ok(self)
    }
}

/// Haversine distance between `a` and `b` in meters.
pub fn distance(a: LatLng, b: LatLng) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    // Rounding can push h past 1 for near-antipodal points.
    let h = ((d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}
