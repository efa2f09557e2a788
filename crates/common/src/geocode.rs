//! Place-name lookup, the only network boundary of the core.
//!
//! The raw lookup may fail; [`resolve_origin`] never does for a non-empty
//! query. It falls back to a fixed coordinate and reports why.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{BeaconError, Result};
use crate::geodesy::LatLng;
use crate::training::Notice;

/// One search hit. `lat`/`lon` arrive as strings from Nominatim and as
/// numbers from other providers; both are accepted.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Place {
    #[serde(deserialize_with = "number_or_string")]
    pub lat: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub lon: f64,
    #[serde(default)]
    pub display_name: String,
}

impl Place {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lon)
    }
}

fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

pub trait Geocoder {
    /// Candidates for `query`, best first. May be empty.
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<Place>>> + Send;
}

/// Nominatim-compatible search endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    url: String,
}

impl NominatimGeocoder {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("beacon-trainer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<Place>> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<Vec<Place>>().await?)
    }
}

/// Outcome of turning a place name into a route origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedOrigin {
    pub origin: LatLng,
    pub label: String,
    pub notice: Option<Notice>,
}

/// Resolves `query` to a coordinate within `timeout`.
///
/// An empty query is a validation error. A failed, timed out, or empty
/// lookup resolves to `fallback` with a [`Notice::GeocoderFallback`].
/// Dropping the returned future cancels the lookup.
pub async fn resolve_origin<G: Geocoder>(
    geocoder: &G,
    query: &str,
    timeout: Duration,
    fallback: LatLng,
) -> Result<ResolvedOrigin> {
    let query = query.trim();
    if query.is_empty() {
        return Err(BeaconError::Validation("place name is empty".to_string()));
    }

    let reason = match tokio::time::timeout(timeout, geocoder.search(query)).await {
        Ok(Ok(places)) => match places.into_iter().next() {
            Some(place) => match place.position().validate() {
                Ok(origin) => {
                    tracing::info!(query, lat = origin.lat, lng = origin.lng, "Place resolved");
                    let label = if place.display_name.is_empty() {
                        query.to_string()
                    } else {
                        place.display_name
                    };
                    return Ok(ResolvedOrigin {
                        origin,
                        label,
                        notice: None,
                    });
                }
                Err(e) => e.to_string(),
            },
            None => "no results".to_string(),
        },
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("timed out after {} ms", timeout.as_millis()),
    };

    tracing::warn!(query, %reason, "Geocoding failed, using fallback origin");
    Ok(ResolvedOrigin {
        origin: fallback,
        label: query.to_string(),
        notice: Some(Notice::GeocoderFallback { reason }),
    })
}
