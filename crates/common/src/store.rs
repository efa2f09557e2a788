//! Durable, ordered beacon collection over a pluggable key-value medium.
//!
//! The whole list lives under a single key and is rewritten on every
//! mutation. Callers sharing a store across tasks must serialize access
//! themselves (the API wraps it in a mutex).

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use redis::Commands;

use crate::beacon::{display_name, Beacon};
use crate::config::{Config, StoreBackend};
use crate::error::Result;
use crate::geodesy::LatLng;

/// Minimal text blob storage.
pub trait KeyValue {
    fn get(&mut self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<K: KeyValue + ?Sized> KeyValue for Box<K> {
    fn get(&mut self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// In-process storage, lost on drop.
#[derive(Debug, Default)]
pub struct MemoryKv {
    values: HashMap<String, String>,
}

impl KeyValue for MemoryKv {
    fn get(&mut self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key inside `dir`.
#[derive(Debug)]
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValue for FileKv {
    fn get(&mut self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let target = self.path_for(key);
        let tmp = target.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        // rename is atomic on the same filesystem
        fs::rename(&tmp, &target)?;
        Ok(())
    }
}

/// Plain `GET`/`SET` on a synchronous redis connection.
pub struct RedisKv {
    conn: redis::Connection,
}

impl RedisKv {
    pub fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection()?;
        Ok(Self { conn })
    }
}

impl KeyValue for RedisKv {
    fn get(&mut self, key: &str) -> Result<Option<String>> {
        Ok(self.conn.get(key)?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let _: () = self.conn.set(key, value)?;
        Ok(())
    }
}

pub type DynKeyValue = Box<dyn KeyValue + Send>;

/// Builds the store selected by `STORE_BACKEND`.
pub fn open_store(config: &Config) -> Result<BeaconStore<DynKeyValue>> {
    let kv: DynKeyValue = match config.store_backend {
        StoreBackend::Memory => Box::new(MemoryKv::default()),
        StoreBackend::File => Box::new(FileKv::new(&config.store_path)),
        StoreBackend::Redis => Box::new(RedisKv::connect(&config.redis_url)?),
    };
    tracing::info!(backend = ?config.store_backend, key = %config.store_key, "Beacon store opened");
    Ok(BeaconStore::new(kv, config.store_key.clone()))
}

pub struct BeaconStore<K> {
    kv: K,
    key: String,
}

impl<K: KeyValue> BeaconStore<K> {
    pub fn new(kv: K, key: impl Into<String>) -> Self {
        Self { kv, key: key.into() }
    }

    /// All beacons in insertion order. A missing key is an empty list.
    pub fn list(&mut self) -> Result<Vec<Beacon>> {
        match self.kv.get(&self.key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn get(&mut self, id: &str) -> Result<Option<Beacon>> {
        Ok(self.list()?.into_iter().find(|b| b.id == id))
    }

    /// Records a new beacon at `position` and persists the updated list.
    pub fn add(&mut self, position: LatLng) -> Result<Beacon> {
        self.add_at(position, Local::now())
    }

    /// Same as [`add`](Self::add) with an explicit creation instant.
    pub fn add_at(&mut self, position: LatLng, now: DateTime<Local>) -> Result<Beacon> {
        let position = position.validate()?;
        let mut beacons = self.list()?;

        let beacon = Beacon {
            id: next_id(&beacons, now.timestamp_millis()),
            name: display_name(beacons.len() + 1),
            lat: position.lat,
            lng: position.lng,
            description: None,
            date_added: now.date_naive(),
        };
        beacons.push(beacon.clone());
        self.save(&beacons)?;

        tracing::info!(id = %beacon.id, lat = beacon.lat, lng = beacon.lng, "Beacon added");
        Ok(beacon)
    }

    /// Deletes the beacon with `id`. Unknown ids are not an error.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        let mut beacons = self.list()?;
        let before = beacons.len();
        beacons.retain(|b| b.id != id);
        self.save(&beacons)?;

        if beacons.len() < before {
            tracing::info!(id, "Beacon removed");
        } else {
            tracing::debug!(id, "Remove ignored, no such beacon");
        }
        Ok(())
    }

    fn save(&mut self, beacons: &[Beacon]) -> Result<()> {
        let raw = serde_json::to_string(beacons)?;
        self.kv.set(&self.key, &raw)
    }
}

// Millisecond timestamp, bumped past any id already taken.
fn next_id(existing: &[Beacon], millis: i64) -> String {
    let mut candidate = millis;
    loop {
        let id = candidate.to_string();
        if !existing.iter().any(|b| b.id == id) {
            return id;
        }
        candidate += 1;
    }
}
