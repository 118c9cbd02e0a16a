//! The backend seam the admin core talks through.

use crate::error::ApiResult;
use crate::types::LoginResponse;
use async_trait::async_trait;
use serde_json::Value;
use tutordesk_types::{DashboardStats, SyncModule};

/// Persistence and assistant services behind the admin console.
///
/// Record payloads are raw JSON; callers convert them with
/// [`tutordesk_types::Record::from_backend`]. Every method either succeeds
/// completely or returns an error without side effects the caller must undo.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Sets or clears the bearer token sent with non-auth requests.
    async fn set_access_token(&self, token: Option<String>);

    async fn list(&self, module: SyncModule) -> ApiResult<Vec<Value>>;

    /// Creates a record and returns it as stored, identifier assigned.
    async fn create(&self, module: SyncModule, body: &Value) -> ApiResult<Value>;

    async fn update(&self, module: SyncModule, id: &str, body: &Value) -> ApiResult<()>;

    async fn delete(&self, module: SyncModule, id: &str) -> ApiResult<()>;

    async fn dashboard_stats(&self) -> ApiResult<DashboardStats>;

    /// Sends a prompt plus context to the assistant and returns its reply.
    async fn chat(&self, prompt: &str, context: &str) -> ApiResult<String>;

    /// Free-text analysis of an inquiry message.
    async fn analyze(&self, message: &str) -> ApiResult<String>;

    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse>;

    async fn signup(&self, name: &str, email: &str, password: &str) -> ApiResult<()>;
}
