//! Application configuration.
//!
//! Read from an optional TOML file, then overridden from the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tutordesk_api::ClientConfig;

pub const ENV_API_BASE_URL: &str = "TUTORDESK_API_BASE_URL";
pub const ENV_PUSH_URL: &str = "TUTORDESK_PUSH_URL";
pub const ENV_STORAGE_PATH: &str = "TUTORDESK_STORAGE_PATH";
pub const ENV_MODE: &str = "TUTORDESK_MODE";

/// Storage path that keeps everything in memory.
pub const IN_MEMORY: &str = ":memory:";

/// Which backend the console talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Remote,
    Local,
}

impl std::str::FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(Mode::Remote),
            "local" => Ok(Mode::Local),
            other => anyhow::bail!("unknown mode '{other}', expected 'remote' or 'local'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// DuckDB file, or `:memory:`.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("tutordesk.duckdb"),
        }
    }
}

impl StorageConfig {
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == IN_MEMORY
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub storage: StorageConfig,
    pub mode: Mode,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Seconds between automatic retention runs in watch mode.
    pub retention_tick_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            storage: StorageConfig::default(),
            mode: Mode::default(),
            log_filter: "info".to_string(),
            retention_tick_secs: 86_400,
        }
    }
}

/// Where the loaded configuration came from, reported once logging is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// The file was absent.
    Defaults(PathBuf),
}

impl AppConfig {
    /// Loads `path` if it exists, then applies environment overrides.
    pub fn load(path: &Path) -> Result<(Self, ConfigSource)> {
        let (mut config, source) = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            let config = Self::from_toml(&content)
                .with_context(|| format!("invalid config {}", path.display()))?;
            (config, ConfigSource::File(path.to_path_buf()))
        } else {
            (Self::default(), ConfigSource::Defaults(path.to_path_buf()))
        };
        config.apply_env()?;
        Ok((config, source))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var(ENV_API_BASE_URL) {
            self.client.api_base_url = url;
        }
        if let Ok(url) = std::env::var(ENV_PUSH_URL) {
            self.client.push_url = url;
        }
        if let Ok(path) = std::env::var(ENV_STORAGE_PATH) {
            self.storage.path = PathBuf::from(path);
        }
        if let Ok(mode) = std::env::var(ENV_MODE) {
            self.mode = mode.parse().with_context(|| format!("invalid {ENV_MODE}"))?;
        }
        Ok(())
    }

    pub fn retention_tick(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.retention_tick_secs.max(1))
    }
}
