//! Wiring of storage, backend, store and session.

use crate::config::{AppConfig, Mode};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use tutordesk_api::{ApiClient, Backend};
use tutordesk_storage::{DuckDbStore, KeyValueStore};
use tutordesk_sync::{AdminSession, LocalBackend, Store};

pub struct App {
    pub config: AppConfig,
    pub session: Arc<AdminSession>,
}

impl App {
    /// Opens the configured storage and builds a session over it.
    pub async fn open(config: AppConfig) -> Result<Self> {
        let storage: Arc<dyn KeyValueStore> = if config.storage.is_in_memory() {
            Arc::new(DuckDbStore::open_in_memory().context("failed to open in-memory storage")?)
        } else {
            Arc::new(DuckDbStore::open(&config.storage.path).with_context(|| {
                format!("failed to open storage at {}", config.storage.path.display())
            })?)
        };
        Self::with_storage(config, storage).await
    }

    /// Builds a session over an already opened storage.
    pub async fn with_storage(config: AppConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let store = Store::load(storage.clone()).context("failed to load local state")?;
        let store = Arc::new(Mutex::new(store));

        let backend: Arc<dyn Backend> = match config.mode {
            Mode::Remote => {
                Arc::new(ApiClient::new(&config.client).context("failed to build API client")?)
            }
            Mode::Local => Arc::new(LocalBackend::new(storage)),
        };
        info!("backend mode: {:?}", config.mode);

        let session = Arc::new(AdminSession::new(backend, store));
        if session.restore().await {
            debug!("restored persisted session");
        }

        Ok(Self { config, session })
    }
}
