//! Application state as an explicit value.
//!
//! Every operation borrows the current [`Session`] and returns the next one,
//! so a failed operation leaves the caller's state untouched.

use rand::Rng;
use serde::Serialize;

use crate::beacon::Beacon;
use crate::error::{BeaconError, Result};
use crate::geodesy::LatLng;
use crate::store::{BeaconStore, KeyValue};
use crate::training::{plan_training, RouteRequest, TrainingPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Home,
    Beacons,
    Training,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub view: View,
    pub beacons: Vec<Beacon>,
    pub origin: Option<LatLng>,
    pub location: Option<String>,
    pub last_plan: Option<TrainingPlan>,
}

impl Session {
    /// Switches view, loading the beacon list fresh from the store.
    pub fn enter<K: KeyValue>(&self, view: View, store: &mut BeaconStore<K>) -> Result<Self> {
        let beacons = store.list()?;
        tracing::debug!(?view, beacons = beacons.len(), "View entered");
        Ok(Self {
            view,
            beacons,
            ..self.clone()
        })
    }

    /// A click on the map: records a beacon on the beacon view, sets the
    /// route origin on the training view.
    pub fn map_click<K: KeyValue>(&self, at: LatLng, store: &mut BeaconStore<K>) -> Result<Self> {
        match self.view {
            View::Beacons => {
                store.add(at)?;
                Ok(Self {
                    beacons: store.list()?,
                    ..self.clone()
                })
            }
            View::Training => Ok(Self {
                origin: Some(at.validate()?),
                ..self.clone()
            }),
            View::Home => Err(BeaconError::Validation(
                "map clicks are only handled on the beacon and training views".to_string(),
            )),
        }
    }

    /// Sets the origin and its label, e.g. after resolving a place name.
    pub fn with_origin(&self, origin: LatLng, location: impl Into<String>) -> Result<Self> {
        Ok(Self {
            origin: Some(origin.validate()?),
            location: Some(location.into()),
            ..self.clone()
        })
    }

    pub fn remove_beacon<K: KeyValue>(&self, id: &str, store: &mut BeaconStore<K>) -> Result<Self> {
        store.remove(id)?;
        Ok(Self {
            beacons: store.list()?,
            ..self.clone()
        })
    }

    /// Plans a training from the loaded beacons around the current origin.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        max_hop_distance: f64,
        desired_count: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let request = RouteRequest::new(self.origin, max_hop_distance, desired_count)?;
        let location = self.location.as_deref().unwrap_or("Custom origin");
        let plan = plan_training(&self.beacons, &request, location, rng)?;
        Ok(Self {
            last_plan: Some(plan),
            ..self.clone()
        })
    }

    /// Drops the current training and its location.
    pub fn clear_training(&self) -> Self {
        Self {
            last_plan: None,
            location: None,
            ..self.clone()
        }
    }
}
