use crate::beacon::Beacon;
use crate::geodesy::{distance, LatLng};

/// Radius around the origin within which beacons are eligible, in meters.
pub const CATCHMENT_RADIUS_M: f64 = 5000.0;

/// Beacons within `radius_m` of `origin` (inclusive), in input order.
pub fn filter_near(beacons: &[Beacon], origin: LatLng, radius_m: f64) -> Vec<Beacon> {
    let near: Vec<Beacon> = beacons
        .iter()
        .filter(|b| distance(origin, b.position()) <= radius_m)
        .cloned()
        .collect();

    tracing::debug!(
        total = beacons.len(),
        near = near.len(),
        radius_m,
        "Catchment filtered"
    );
    near
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon::fixture as beacon;

    #[test]
    fn keeps_only_beacons_inside_radius_in_order() {
        let origin = LatLng::new(40.0, -3.0);
        let beacons = vec![
            beacon("a", 40.01, -3.0),  // ~1.1 km
            beacon("b", 40.5, -3.0),   // ~55 km
            beacon("c", 40.0, -3.02),  // ~1.7 km
            beacon("d", 40.04, -3.0),  // ~4.4 km
        ];

        let near = filter_near(&beacons, origin, CATCHMENT_RADIUS_M);
        let ids: Vec<&str> = near.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
        for b in &near {
            assert!(distance(origin, b.position()) <= CATCHMENT_RADIUS_M);
        }
    }

    #[test]
    fn boundary_is_inclusive() {
        let origin = LatLng::new(40.0, -3.0);
        let edge = beacon("edge", 40.03, -3.01);
        let radius = distance(origin, edge.position());

        assert_eq!(filter_near(&[edge.clone()], origin, radius).len(), 1);

        // The same point just past a slightly smaller radius is excluded.
        let shrunk = radius - 1e-6;
        assert!(filter_near(&[edge], origin, shrunk).is_empty());
    }

    #[test]
    fn empty_input_or_no_match_is_empty() {
        let origin = LatLng::new(0.0, 0.0);
        assert!(filter_near(&[], origin, CATCHMENT_RADIUS_M).is_empty());
        assert!(filter_near(&[beacon("far", 10.0, 10.0)], origin, CATCHMENT_RADIUS_M).is_empty());
    }
}
