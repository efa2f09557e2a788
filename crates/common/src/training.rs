//! Training planner: catchment, route, framing and the printable sheet.

use std::fmt;

use chrono::{Local, NaiveDate};
use rand::Rng;
use serde::Serialize;

use crate::beacon::{display_name, Beacon};
use crate::catchment::{filter_near, CATCHMENT_RADIUS_M};
use crate::error::{BeaconError, Result};
use crate::framing::{compute_framing, Framing};
use crate::geodesy::LatLng;
use crate::route::{self, Route};

/// Non-fatal outcomes attached to a successful operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The walk ran out of reachable beacons.
    PartialRoute { requested: usize, produced: usize },
    /// Place lookup failed; the default origin was used.
    GeocoderFallback { reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::PartialRoute { requested, produced } => write!(
                f,
                "only {produced} of {requested} beacons could be chained within the hop distance"
            ),
            Notice::GeocoderFallback { reason } => {
                write!(f, "place lookup failed ({reason}), using the default origin")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub origin: LatLng,
    pub max_hop_distance: f64,
    pub desired_count: usize,
    pub catchment_radius: f64,
}

impl RouteRequest {
    /// Validates the parameters; the catchment radius is always
    /// [`CATCHMENT_RADIUS_M`].
    pub fn new(origin: Option<LatLng>, max_hop_distance: f64, desired_count: usize) -> Result<Self> {
        let origin = origin
            .ok_or_else(|| BeaconError::Validation("route origin is missing".to_string()))?
            .validate()?;

        if !max_hop_distance.is_finite() || max_hop_distance <= 0.0 {
            return Err(BeaconError::Validation(format!(
                "max hop distance must be a positive number of meters, got {max_hop_distance}"
            )));
        }
        if desired_count < 1 {
            return Err(BeaconError::Validation(
                "desired beacon count must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            origin,
            max_hop_distance,
            desired_count,
            catchment_radius: CATCHMENT_RADIUS_M,
        })
    }
}

/// Map marker contract consumed by the map surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: String,
    pub position: LatLng,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPlan {
    pub request: RouteRequest,
    pub route: Route,
    pub framing: Framing,
    pub markers: Vec<Marker>,
    pub start_marker: Marker,
    pub notices: Vec<Notice>,
    pub sheet: TrainingSheet,
}

/// Everything the print/export view shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSheet {
    pub location: String,
    pub beacon_count: usize,
    pub max_hop_distance: f64,
    pub catchment_radius: f64,
    pub generated_on: NaiveDate,
    pub rows: Vec<SheetRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRow {
    pub number: usize,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Distance from the previous control; `None` for the first.
    pub hop_distance: Option<f64>,
}

impl fmt::Display for TrainingSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Training - {}", self.location)?;
        writeln!(
            f,
            "Beacons: {} | Max hop: {:.0} m | Radius: {:.1} km | Generated: {}",
            self.beacon_count,
            self.max_hop_distance,
            self.catchment_radius / 1000.0,
            self.generated_on.format("%Y-%m-%d")
        )?;
        for row in &self.rows {
            write!(f, "{:>3}. {}  {:.4}°, {:.4}°", row.number, row.name, row.lat, row.lng)?;
            if let Some(hop) = row.hop_distance {
                write!(f, "  (+{hop:.0} m)")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl TrainingSheet {
    fn new(location: &str, request: &RouteRequest, route: &Route, generated_on: NaiveDate) -> Self {
        let hops = route.hop_distances();
        let rows = route
            .beacons
            .iter()
            .enumerate()
            .map(|(i, beacon)| SheetRow {
                number: i + 1,
                name: beacon.name.clone(),
                lat: beacon.lat,
                lng: beacon.lng,
                hop_distance: i.checked_sub(1).map(|prev| hops[prev]),
            })
            .collect();

        Self {
            location: location.to_string(),
            beacon_count: route.len(),
            max_hop_distance: request.max_hop_distance,
            catchment_radius: request.catchment_radius,
            generated_on,
            rows,
        }
    }
}

/// Plans a training from the saved `beacons`.
///
/// Fails with [`BeaconError::NoCandidates`] when no beacon lies in the
/// catchment around the origin. A route shorter than requested is returned
/// with a [`Notice::PartialRoute`].
pub fn plan_training<R: Rng + ?Sized>(
    beacons: &[Beacon],
    request: &RouteRequest,
    location: &str,
    rng: &mut R,
) -> Result<TrainingPlan> {
    let candidates = filter_near(beacons, request.origin, request.catchment_radius);
    if candidates.is_empty() {
        tracing::warn!(
            saved = beacons.len(),
            radius_m = request.catchment_radius,
            "No beacons in catchment"
        );
        return Err(BeaconError::NoCandidates {
            radius_m: request.catchment_radius,
        });
    }

    let route = route::build(&candidates, request.max_hop_distance, request.desired_count, rng);

    let mut notices = Vec::new();
    if route.is_partial() {
        tracing::warn!(
            requested = route.requested,
            produced = route.len(),
            "Route ended early"
        );
        notices.push(Notice::PartialRoute {
            requested: route.requested,
            produced: route.len(),
        });
    }

    let points: Vec<LatLng> = route.beacons.iter().map(Beacon::position).collect();
    let framing = compute_framing(&points);
    let markers = route
        .beacons
        .iter()
        .enumerate()
        .map(|(i, b)| Marker {
            id: b.id.clone(),
            position: b.position(),
            title: display_name(i + 1),
        })
        .collect();
    let start_marker = Marker {
        id: "start".to_string(),
        position: request.origin,
        title: "Start".to_string(),
    };
    let sheet = TrainingSheet::new(location, request, &route, Local::now().date_naive());

    tracing::info!(
        beacons = route.len(),
        length_m = route.total_distance(),
        zoom = framing.zoom,
        "Training planned"
    );

    Ok(TrainingPlan {
        request: *request,
        route,
        framing,
        markers,
        start_marker,
        notices,
        sheet,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon::fixture as beacon;
    use crate::geodesy::distance;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ORIGIN: LatLng = LatLng::new(40.0, -3.0);

    fn request(max_hop: f64, count: usize) -> RouteRequest {
        RouteRequest::new(Some(ORIGIN), max_hop, count).unwrap()
    }

    #[test]
    fn request_validation() {
        assert!(matches!(
            RouteRequest::new(None, 500.0, 3),
            Err(BeaconError::Validation(_))
        ));
        assert!(RouteRequest::new(Some(ORIGIN), 0.0, 3).is_err());
        assert!(RouteRequest::new(Some(ORIGIN), -5.0, 3).is_err());
        assert!(RouteRequest::new(Some(ORIGIN), f64::NAN, 3).is_err());
        assert!(RouteRequest::new(Some(ORIGIN), 500.0, 0).is_err());
        assert!(RouteRequest::new(Some(LatLng::new(95.0, 0.0)), 500.0, 3).is_err());

        let ok = RouteRequest::new(Some(ORIGIN), 500.0, 3).unwrap();
        assert_eq!(ok.catchment_radius, CATCHMENT_RADIUS_M);
    }

    #[test]
    fn nothing_in_catchment_is_no_candidates() {
        let far = vec![beacon("far", 41.0, -3.0)];
        let mut rng = StdRng::seed_from_u64(1);
        let err = plan_training(&far, &request(500.0, 3), "Test", &mut rng).unwrap_err();
        assert!(matches!(err, BeaconError::NoCandidates { radius_m } if radius_m == 5000.0));
    }

    #[test]
    fn beacons_outside_catchment_never_enter_the_route() {
        let beacons = vec![
            beacon("in", 40.001, -3.0),
            // ~5.6 km from the origin
            beacon("out", 40.05, -3.0),
        ];
        let mut rng = StdRng::seed_from_u64(5);
        let plan = plan_training(&beacons, &request(100_000.0, 2), "Test", &mut rng).unwrap();
        assert_eq!(plan.route.len(), 1);
        assert_eq!(plan.route.beacons[0].id, "in");
        assert_eq!(
            plan.notices,
            vec![Notice::PartialRoute {
                requested: 2,
                produced: 1
            }]
        );
    }

    #[test]
    fn plan_carries_markers_framing_and_sheet() {
        let beacons = vec![
            beacon("a", 40.001, -3.0),
            beacon("b", 40.002, -3.0),
            beacon("c", 40.003, -3.0),
        ];
        let mut rng = StdRng::seed_from_u64(9);
        let plan = plan_training(&beacons, &request(1000.0, 3), "Madrid", &mut rng).unwrap();

        assert_eq!(plan.route.len(), 3);
        assert!(plan.notices.is_empty());
        let titles: Vec<&str> = plan.markers.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Beacon 1", "Beacon 2", "Beacon 3"]);
        assert_eq!(plan.start_marker.position, ORIGIN);
        assert_eq!(plan.framing.center.lat, (40.001 + 40.003) / 2.0);
        assert_eq!(plan.framing.zoom, 16);

        let sheet = &plan.sheet;
        assert_eq!(sheet.location, "Madrid");
        assert_eq!(sheet.beacon_count, 3);
        assert_eq!(sheet.rows[0].hop_distance, None);
        let expected = distance(plan.route.beacons[0].position(), plan.route.beacons[1].position());
        assert_eq!(sheet.rows[1].hop_distance, Some(expected));
    }

    #[test]
    fn sheet_renders_as_text() {
        let beacons = vec![beacon("a", 40.001, -3.0), beacon("b", 40.002, -3.0)];
        let mut rng = StdRng::seed_from_u64(2);
        let plan = plan_training(&beacons, &request(500.0, 2), "Retiro", &mut rng).unwrap();
        let text = plan.sheet.to_string();

        assert!(text.starts_with("Training - Retiro\n"));
        assert!(text.contains("Max hop: 500 m"));
        assert!(text.contains("Radius: 5.0 km"));
        assert!(text.contains("  1. Beacon "));
        assert!(text.contains("(+111 m)"));
    }

    #[test]
    fn notices_describe_themselves() {
        let partial = Notice::PartialRoute {
            requested: 5,
            produced: 2,
        };
        assert!(partial.to_string().contains("only 2 of 5"));
        let json = serde_json::to_value(&partial).unwrap();
        assert_eq!(json["kind"], "partial_route");
    }
}
