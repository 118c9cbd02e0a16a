//! Durable key/value persistence for TutorDesk.
//!
//! The admin core keeps every collection and setting under a stable string
//! key, serialized as JSON. This crate owns that persistence seam:
//!
//! - [`KeyValueStore`] is the adapter interface the core writes through
//! - [`MemoryStore`] is a process-local implementation for tests and demos
//! - [`DuckDbStore`] is the durable implementation, one row per key
//!
//! Key names live in [`keys`] and must stay stable within a deployment,
//! since they are the only persistence in local-only mode.

mod duckdb_store;
mod error;
pub mod keys;
mod memory;

pub use duckdb_store::DuckDbStore;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Storage adapter the admin core persists through.
///
/// Writes are synchronous: once `set` returns `Ok`, the value survives a
/// restart of the process.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    fn remove(&self, key: &str) -> StorageResult<()>;

    fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Reads and deserializes a JSON value stored under `key`.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> StorageResult<Option<T>> {
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Serializes `value` as JSON and stores it under `key`.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> StorageResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
