//! Common library for the beacon trainer.
//!
//! This crate holds the whole route-generation core shared by the API and the
//! simulator: geodesy, the beacon store and its backends, the catchment
//! filter, the route builder, map framing, the geocoder adapter, and the
//! configuration, error and telemetry plumbing.

// Configuration management
pub mod config;
pub use config::Config;

// Error handling types
pub mod error;
pub use error::{BeaconError, Result};

// Telemetry and observability
pub mod telemetry;
pub use telemetry::init_tracing;

// Geographic core
pub mod beacon;
pub mod catchment;
pub mod framing;
pub mod geodesy;
pub mod route;

pub use beacon::Beacon;
pub use geodesy::{distance, LatLng};

// Persistence
pub mod store;
pub use store::{open_store, BeaconStore, KeyValue};

// Place-name lookup
pub mod geocode;

// Orchestration
pub mod session;
pub mod training;
