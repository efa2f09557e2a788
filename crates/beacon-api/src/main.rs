//! HTTP surface of the beacon trainer.
//!
//! Serves the beacon list, beacon creation from map clicks, place lookup and
//! training generation to the map and print views.

mod app;

use std::sync::Arc;

use anyhow::Context;
use beacon_common::geocode::NominatimGeocoder;
use beacon_common::{init_tracing, open_store, Config};
use tracing::info;

use crate::app::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}. Using defaults.");
        Config::default()
    });
    init_tracing("beacon-api", &config.log_level);

    let store = open_store(&config).context("Failed to open beacon store")?;
    let geocoder = NominatimGeocoder::new(&config.geocoder_url, config.geocoder_timeout())
        .context("Failed to build geocoder client")?;

    let addr = config.api_addr.clone();
    let state = Arc::new(AppState::new(store, geocoder, config));
    let app = app::router(state);

    info!("🚀 API listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
