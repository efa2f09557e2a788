//! Saved waypoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::geodesy::LatLng;

/// A saved geographic waypoint usable as a route control point.
///
/// Serialized as `{id, name, lat, lng, description?, dateAdded}`. Once
/// created only the whole record can be removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beacon {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date_added: NaiveDate,
}

impl Beacon {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// Display name for the `n`-th beacon (1-based).
pub fn display_name(n: usize) -> String {
    format!("Beacon {n}")
}

#[cfg(test)]
pub(crate) fn fixture(id: &str, lat: f64, lng: f64) -> Beacon {
    Beacon {
        id: id.to_string(),
        name: format!("Beacon {id}"),
        lat,
        lng,
        description: None,
        date_added: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    }
}
