//! Seeds random beacons around the default origin, the way a user dropping
//! pins on the map would, then generates and prints a training.

use std::time::Duration;

use anyhow::{Context, Result};
use beacon_common::training::{plan_training, RouteRequest};
use beacon_common::{init_tracing, open_store, BeaconStore, Config, KeyValue, LatLng};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::signal;

/// Maximum offset from the origin, in degrees, for seeded beacons.
const SCATTER_DEG: f64 = 0.05;
const MAX_HOP_M: f64 = 1500.0;
const TRAINING_SIZE: usize = 5;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Config first, its log level drives the subscriber
    let config = Config::from_env()?;
    init_tracing("beacon-sim", &config.log_level);

    // 2. Store and random source
    let mut store = open_store(&config).context("Failed to open beacon store")?;
    let mut rng = match config.sim_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // 3. Graceful shutdown
    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::warn!("Received shutdown signal");
    };

    // 4. Seed, then plan
    tracing::info!("Seeding {} beacons...", config.sim_beacons);
    tokio::select! {
        result = seed_beacons(&mut store, &mut rng, &config) => {
            result?;
        }
        _ = shutdown => {
            tracing::info!("Shutting down before planning");
            return Ok(());
        }
    }

    let beacons = store.list()?;
    let request = RouteRequest::new(Some(config.default_origin()), MAX_HOP_M, TRAINING_SIZE)?;
    match plan_training(&beacons, &request, "Simulated area", &mut rng) {
        Ok(plan) => {
            for notice in &plan.notices {
                tracing::warn!("{}", notice);
            }
            println!("{}", plan.sheet);
        }
        Err(e) => tracing::error!("Training generation failed: {}", e),
    }

    Ok(())
}

async fn seed_beacons<K: KeyValue>(
    store: &mut BeaconStore<K>,
    rng: &mut StdRng,
    config: &Config,
) -> Result<()> {
    let origin = config.default_origin();
    // One pin every 100ms
    let mut interval = tokio::time::interval(Duration::from_millis(100));

    for _ in 0..config.sim_beacons {
        interval.tick().await;

        let at = LatLng::new(
            origin.lat + rng.gen_range(-SCATTER_DEG..=SCATTER_DEG),
            origin.lng + rng.gen_range(-SCATTER_DEG..=SCATTER_DEG),
        );
        let beacon = store.add(at)?;
        tracing::info!("Placed {} at {:.5}, {:.5}", beacon.name, beacon.lat, beacon.lng);
    }

    Ok(())
}
