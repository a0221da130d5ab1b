//! Key/value persistence for profile and settings
//!
//! Backends:
//! - `FileStorage`: one JSON file per key in a data directory (native)
//! - `LocalStorage`: browser LocalStorage (wasm32)
//! - `MemoryStorage`: in-process map (tests, fallback)
//!
//! Storage failures never reach the simulation: loaders fall back to
//! defaults and log, savers report an error the caller may log and ignore.

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

use std::collections::HashMap;

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A string key/value store
pub trait Storage {
    /// Read a value; `Ok(None)` when the key has never been written
    fn read(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// In-memory storage
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load a JSON value, falling back to `T::default()` on any problem
pub fn load_or_default<T>(storage: &dyn Storage, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match storage.read(key) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(value) => {
                log::info!("Loaded {}", key);
                value
            }
            Err(e) => {
                log::warn!("Corrupt data for {} ({}), using defaults", key, e);
                T::default()
            }
        },
        Ok(None) => {
            log::info!("No saved {}, starting fresh", key);
            T::default()
        }
        Err(e) => {
            log::warn!("Failed to read {}: {:#}", key, e);
            T::default()
        }
    }
}

/// Serialize a value as JSON under `key`
pub fn save_json<T: Serialize>(storage: &mut dyn Storage, key: &str, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).with_context(|| format!("serializing {key}"))?;
    storage.write(key, &json)?;
    log::debug!("Saved {}", key);
    Ok(())
}
