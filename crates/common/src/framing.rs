//! Map framing: a display center and a discrete zoom level for a set of points.

use geo::{BoundingRect, MultiPoint, Point};
use serde::Serialize;

use crate::geodesy::LatLng;

/// Center shown when there is nothing to frame (Madrid).
pub const DEFAULT_CENTER: LatLng = LatLng::new(40.4168, -3.7038);
pub const DEFAULT_ZOOM: u8 = 14;

/// Zoom for spans at or below the last step, including a single point.
pub const BASE_ZOOM: u8 = 16;

/// `(span greater than, zoom)` in degrees, widest first. Must stay descending
/// in both columns.
const ZOOM_STEPS: [(f64, u8); 6] = [
    (0.2, 8),
    (0.1, 10),
    (0.05, 12),
    (0.02, 13),
    (0.01, 14),
    (0.005, 15),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Framing {
    pub center: LatLng,
    pub zoom: u8,
}

impl Default for Framing {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

/// Frames `points` by the midpoint of their bounding box.
pub fn compute_framing(points: &[LatLng]) -> Framing {
    let cloud: MultiPoint<f64> = points.iter().map(|p| Point::new(p.lng, p.lat)).collect();
    let Some(bounds) = cloud.bounding_rect() else {
        return Framing::default();
    };

    let center = bounds.center();
    let span = bounds.width().max(bounds.height());

    Framing {
        center: LatLng::new(center.y, center.x),
        zoom: zoom_for_span(span),
    }
}

/// Maps a span in degrees to a zoom level through the step table.
pub fn zoom_for_span(span: f64) -> u8 {
    ZOOM_STEPS
        .iter()
        .find(|(threshold, _)| span > *threshold)
        .map(|(_, zoom)| *zoom)
        .unwrap_or(BASE_ZOOM)
}
