//! DuckDB-backed key/value store.
//!
//! One row per key in a `kv_store` table. Values are opaque strings (the
//! admin core writes JSON); `updated_at` records the last write in
//! milliseconds since the epoch.

use crate::error::{StorageError, StorageResult};
use crate::KeyValueStore;
use duckdb::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

const MEMORY_LIMIT: &str = "64MB";

/// Durable key/value store backed by DuckDB.
#[derive(Clone)]
pub struct DuckDbStore {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbStore {
    /// Opens or creates a store at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = open_connection(path)?;
        initialize_kv_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_kv_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Lists every stored key, sorted.
    pub fn keys(&self) -> StorageResult<Vec<String>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for key in rows {
            keys.push(key?);
        }
        Ok(keys)
    }

    /// Last write time of `key`, in milliseconds since the epoch.
    pub fn updated_at(&self, key: &str) -> StorageResult<Option<i64>> {
        let conn = self.lock();
        let result = conn.query_row(
            "SELECT updated_at FROM kv_store WHERE key = ?",
            params![key],
            |row| row.get::<_, i64>(0),
        );
        match result {
            Ok(ts) => Ok(Some(ts)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // A panic while holding the lock leaves the connection usable.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("recovering from poisoned kv_store mutex");
            poisoned.into_inner()
        })
    }
}

impl KeyValueStore for DuckDbStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = self.lock();
        let result = conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?",
            params![key],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(value) => Ok(Some(value)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)",
            params![key, value, chrono::Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let conn = self.lock();
        conn.execute("DELETE FROM kv_store WHERE key = ?", params![key])?;
        Ok(())
    }
}

/// Write-ahead log DuckDB keeps beside the database file.
fn wal_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".wal");
    PathBuf::from(name)
}

/// Opens the database file, discarding a stale WAL left by an unclean
/// shutdown if that is what blocks the open. Retries once.
fn open_connection(path: &Path) -> StorageResult<Connection> {
    let conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(e) => {
            let wal = wal_path(path);
            if !wal.exists() {
                return Err(e.into());
            }
            warn!(
                "kv store at {} failed to open ({e}), discarding {}",
                path.display(),
                wal.display()
            );
            std::fs::remove_file(&wal).map_err(|io| {
                StorageError::Unavailable(format!("cannot remove {}: {io}", wal.display()))
            })?;
            Connection::open(path)?
        }
    };
    conn.execute_batch(&format!("SET memory_limit = '{MEMORY_LIMIT}'; SET threads = 1;"))?;
    Ok(conn)
}

fn initialize_kv_schema(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS kv_store (
            key VARCHAR PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at BIGINT NOT NULL
        );
        "#,
    )?;
    Ok(())
}
