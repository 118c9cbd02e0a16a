//! Backend client configuration.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};

const API_SUFFIX: &str = "/api/v1";

/// Configuration for the REST and push clients.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the backend (e.g., "https://admin.example.com").
    /// `/api/v1` is appended unless already present.
    pub api_base_url: String,

    /// Base URL of the Socket.IO push server.
    pub push_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Delay before reconnecting a dropped push channel (seconds).
    pub reconnect_delay_secs: u64,

    /// Maximum consecutive push reconnect attempts (0 = infinite).
    pub max_reconnect_attempts: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            push_url: "http://localhost:5000".to_string(),
            request_timeout_secs: 30,
            reconnect_delay_secs: 5,
            max_reconnect_attempts: 0,
        }
    }
}

impl ClientConfig {
    /// The API root every resource path is joined onto.
    pub fn api_root(&self) -> String {
        if self.api_base_url.ends_with(API_SUFFIX) {
            self.api_base_url.clone()
        } else {
            format!("{}{API_SUFFIX}", self.api_base_url.trim_end_matches('/'))
        }
    }

    /// WebSocket endpoint of the Socket.IO server (Engine.IO v4).
    pub fn push_endpoint(&self) -> ApiResult<String> {
        let base = self.push_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else if base.starts_with("ws://") || base.starts_with("wss://") {
            base.to_string()
        } else {
            return Err(ApiError::Config(format!(
                "push_url must be an http(s) or ws(s) URL: {}",
                self.push_url
            )));
        };
        Ok(format!("{ws_base}/socket.io/?EIO=4&transport=websocket"))
    }
}
