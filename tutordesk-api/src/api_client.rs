//! HTTP client for the admin REST API.
//!
//! Unwraps the `{ success, data | message }` envelope, attaches the bearer
//! token to every non-auth request, and surfaces backend failure messages
//! verbatim. Uses reqwest with JSON serialization.

use crate::backend::Backend;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::types::*;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use tutordesk_types::{DashboardStats, SyncModule};

const GENERIC_FAILURE: &str = "API request failed";

/// State shared across API client clones.
struct AuthState {
    access_token: Option<String>,
}

/// HTTP client for the admin backend.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_root: String,
    auth: Arc<RwLock<AuthState>>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_root: config.api_root(),
            auth: Arc::new(RwLock::new(AuthState { access_token: None })),
        })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub async fn is_authenticated(&self) -> bool {
        self.auth.read().await.access_token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_root, path)
    }

    /// Builds a request carrying the bearer token, when one is set.
    async fn authed(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.auth.read().await.access_token.clone() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json(
        &self,
        method: Method,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> ApiResult<Option<Value>> {
        debug!("{method} {path}");
        let resp = self.authed(method, path).await.json(body).send().await?;
        read_envelope(resp).await
    }

    async fn send_empty(&self, method: Method, path: &str) -> ApiResult<Option<Value>> {
        debug!("{method} {path}");
        let resp = self.authed(method, path).await.send().await?;
        read_envelope(resp).await
    }

    fn record_path(module: SyncModule, id: &str) -> String {
        format!("{}/{}", module.resource_path(), urlencoding::encode(id))
    }
}

/// Unwraps the response envelope.
///
/// Any non-2xx status or `success: false` is a failure carrying the
/// backend's `message` when it sent one. A 2xx body that is not an envelope
/// yields no data.
async fn read_envelope(resp: Response) -> ApiResult<Option<Value>> {
    let status = resp.status();
    let body = resp.bytes().await?;
    let envelope: Option<Envelope> = if body.is_empty() {
        None
    } else {
        serde_json::from_slice(&body).ok()
    };

    if !status.is_success() {
        let message = envelope
            .and_then(|e| e.message)
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        warn!("backend returned {status}: {message}");
        return Err(ApiError::Backend(message));
    }

    match envelope {
        Some(Envelope {
            success: Some(false),
            message,
            ..
        }) => Err(ApiError::Backend(
            message.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        )),
        Some(envelope) => Ok(envelope.data),
        None => {
            if !body.is_empty() {
                debug!("{status} response without a JSON envelope, ignoring body");
            }
            Ok(None)
        }
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn set_access_token(&self, token: Option<String>) {
        self.auth.write().await.access_token = token;
    }

    async fn list(&self, module: SyncModule) -> ApiResult<Vec<Value>> {
        let data = self.send_empty(Method::GET, module.resource_path()).await?;
        match data {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(ApiError::UnexpectedResponse(format!(
                "expected a list of {module}, got {other}"
            ))),
        }
    }

    async fn create(&self, module: SyncModule, body: &Value) -> ApiResult<Value> {
        let data = self
            .send_json(Method::POST, module.resource_path(), body)
            .await?;
        match data {
            Some(record @ Value::Object(_)) => Ok(record),
            _ => Err(ApiError::UnexpectedResponse(format!(
                "create {module} returned no record"
            ))),
        }
    }

    async fn update(&self, module: SyncModule, id: &str, body: &Value) -> ApiResult<()> {
        self.send_json(Method::PUT, &Self::record_path(module, id), body)
            .await?;
        Ok(())
    }

    async fn delete(&self, module: SyncModule, id: &str) -> ApiResult<()> {
        self.send_empty(Method::DELETE, &Self::record_path(module, id))
            .await?;
        Ok(())
    }

    async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        let data = self.send_empty(Method::GET, "dashboard/stats").await?;
        let data = data.ok_or_else(|| {
            ApiError::UnexpectedResponse("dashboard stats missing".to_string())
        })?;
        Ok(serde_json::from_value(data)?)
    }

    async fn chat(&self, prompt: &str, context: &str) -> ApiResult<String> {
        let data = self
            .send_json(Method::POST, "dashboard/chat", &ChatRequest { prompt, context })
            .await?;
        Ok(reply_text(data))
    }

    async fn analyze(&self, message: &str) -> ApiResult<String> {
        let data = self
            .send_json(Method::POST, "dashboard/analyze", &AnalyzeRequest { message })
            .await?;
        Ok(reply_text(data))
    }

    // ── Auth (never carries a bearer token) ──

    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        debug!("POST auth/login");
        let resp = self
            .client
            .post(self.url("auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let data = read_envelope(resp)
            .await
            .map_err(|e| ApiError::AuthFailed(e.user_message()))?
            .ok_or_else(|| ApiError::AuthFailed("login returned no session".to_string()))?;
        let session: LoginResponse = serde_json::from_value(data)?;

        self.set_access_token(Some(session.token.clone())).await;
        Ok(session)
    }

    async fn signup(&self, name: &str, email: &str, password: &str) -> ApiResult<()> {
        debug!("POST auth/signup");
        let resp = self
            .client
            .post(self.url("auth/signup"))
            .json(&SignupRequest {
                name,
                email,
                password,
            })
            .send()
            .await?;
        read_envelope(resp).await?;
        Ok(())
    }
}
