use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use beacon_common::framing::{compute_framing, Framing};
use beacon_common::geocode::{resolve_origin, Geocoder, ResolvedOrigin};
use beacon_common::store::DynKeyValue;
use beacon_common::training::{plan_training, RouteRequest, TrainingPlan};
use beacon_common::{Beacon, BeaconError, BeaconStore, Config, LatLng};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Training size used when the request leaves `count` out.
const DEFAULT_COUNT: usize = 5;

pub struct AppState<G> {
    /// Whole-list rewrites are serialized by this lock.
    store: Mutex<BeaconStore<DynKeyValue>>,
    geocoder: G,
    config: Config,
}

impl<G> AppState<G> {
    pub fn new(store: BeaconStore<DynKeyValue>, geocoder: G, config: Config) -> Self {
        Self {
            store: Mutex::new(store),
            geocoder,
            config,
        }
    }
}

pub fn router<G>(state: Arc<AppState<G>>) -> Router
where
    G: Geocoder + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check::<G>))
        .route("/beacons", get(list_beacons::<G>).post(create_beacon::<G>))
        .route("/beacons/:id", delete(delete_beacon::<G>))
        .route("/geocode", get(geocode::<G>))
        .route("/trainings", post(create_training::<G>))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

// --- ERRORS ---

pub struct ApiError(BeaconError);

impl From<BeaconError> for ApiError {
    fn from(err: BeaconError) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BeaconError::Validation(_) => StatusCode::BAD_REQUEST,
            BeaconError::NoCandidates { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// --- HANDLERS ---

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    beacons: usize,
}

async fn health_check<G>(State(state): State<Arc<AppState<G>>>) -> ApiResult<Json<HealthStatus>> {
    let beacons = state.store.lock().await.list()?.len();
    Ok(Json(HealthStatus {
        status: "OK".to_string(),
        beacons,
    }))
}

#[derive(Serialize)]
struct BeaconList {
    beacons: Vec<Beacon>,
    framing: Framing,
}

async fn list_beacons<G>(State(state): State<Arc<AppState<G>>>) -> ApiResult<Json<BeaconList>> {
    let beacons = state.store.lock().await.list()?;
    let points: Vec<LatLng> = beacons.iter().map(Beacon::position).collect();
    let framing = compute_framing(&points);
    Ok(Json(BeaconList { beacons, framing }))
}

async fn create_beacon<G>(
    State(state): State<Arc<AppState<G>>>,
    Json(at): Json<LatLng>,
) -> ApiResult<(StatusCode, Json<Beacon>)> {
    let beacon = state.store.lock().await.add(at)?;
    Ok((StatusCode::CREATED, Json(beacon)))
}

async fn delete_beacon<G>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.store.lock().await.remove(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct GeocodeQuery {
    q: String,
}

async fn geocode<G: Geocoder>(
    State(state): State<Arc<AppState<G>>>,
    Query(query): Query<GeocodeQuery>,
) -> ApiResult<Json<ResolvedOrigin>> {
    let resolved = resolve_origin(
        &state.geocoder,
        &query.q,
        state.config.geocoder_timeout(),
        state.config.default_origin(),
    )
    .await?;
    Ok(Json(resolved))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrainingBody {
    origin: Option<LatLng>,
    location: Option<String>,
    max_hop_distance: f64,
    count: Option<usize>,
}

async fn create_training<G: Geocoder>(
    State(state): State<Arc<AppState<G>>>,
    Json(body): Json<TrainingBody>,
) -> ApiResult<Json<TrainingPlan>> {
    let mut notices = Vec::new();
    let (origin, label) = match (body.origin, body.location.as_deref()) {
        (Some(origin), location) => (Some(origin), location.unwrap_or("Custom origin").to_string()),
        (None, Some(location)) => {
            let resolved = resolve_origin(
                &state.geocoder,
                location,
                state.config.geocoder_timeout(),
                state.config.default_origin(),
            )
            .await?;
            notices.extend(resolved.notice);
            (Some(resolved.origin), location.trim().to_string())
        }
        (None, None) => (None, String::new()),
    };

    let request = RouteRequest::new(origin, body.max_hop_distance, body.count.unwrap_or(DEFAULT_COUNT))?;
    let beacons = state.store.lock().await.list()?;

    let mut rng = StdRng::from_entropy();
    let mut plan = plan_training(&beacons, &request, &label, &mut rng)?;
    notices.append(&mut plan.notices);
    plan.notices = notices;

    info!("📍 Training generated with {} beacons near {}", plan.route.len(), label);
    Ok(Json(plan))
}
