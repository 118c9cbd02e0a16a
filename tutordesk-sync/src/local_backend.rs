//! Local-only backend for demo mode.
//!
//! Serves the collections the store has already persisted, so the admin core
//! runs unchanged without a network. Identifiers are time-ordered UUIDs.

use crate::session::DEMO_ADMIN_PASSWORD;
use crate::store::storage_key;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use tutordesk_api::types::LoginResponse;
use tutordesk_api::{ApiError, ApiResult, Backend};
use tutordesk_storage::{KeyValueStore, StorageError, keys, read_json, write_json};
use tutordesk_types::{AdminUser, Appointment, ContactInquiry, DashboardStats, Status, SyncModule};

pub const DEMO_ADMIN_EMAIL: &str = "admin@righttutor.com";
const DEMO_ADMIN_NAME: &str = "Default Admin";

/// Reply to chat prompts while offline.
pub const LOCAL_CHAT_NOTICE: &str =
    "The AI assistant is unavailable in local mode. Connect to a backend to use it.";

fn avatar_for(seed: &str) -> String {
    format!(
        "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
        urlencoding::encode(seed)
    )
}

fn storage_failure(e: StorageError) -> ApiError {
    ApiError::Backend(format!("local storage unavailable: {e}"))
}

/// [`Backend`] over the local key/value store.
pub struct LocalBackend {
    storage: Arc<dyn KeyValueStore>,
}

impl LocalBackend {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    fn read_list(&self, key: &str) -> ApiResult<Vec<Value>> {
        read_json(self.storage.as_ref(), key)
            .map(Option::unwrap_or_default)
            .map_err(storage_failure)
    }

    fn demo_admin(email: &str) -> AdminUser {
        AdminUser {
            name: DEMO_ADMIN_NAME.to_string(),
            email: email.to_string(),
            phone: String::new(),
            avatar: avatar_for("admin"),
            password: None,
        }
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn set_access_token(&self, _token: Option<String>) {}

    async fn list(&self, module: SyncModule) -> ApiResult<Vec<Value>> {
        self.read_list(storage_key(module))
    }

    async fn create(&self, module: SyncModule, body: &Value) -> ApiResult<Value> {
        let Value::Object(map) = body else {
            return Err(ApiError::Backend(format!("{module} record must be an object")));
        };
        let mut record = map.clone();
        let has_id = record
            .get("id")
            .and_then(Value::as_str)
            .is_some_and(|id| !id.is_empty());
        if !has_id {
            let id = uuid::Uuid::now_v7().to_string();
            debug!("assigned local id {id} to new {module} record");
            record.insert("id".to_string(), Value::String(id));
        }
        Ok(Value::Object(record))
    }

    // The store persists acknowledged changes itself
    async fn update(&self, _module: SyncModule, _id: &str, _body: &Value) -> ApiResult<()> {
        Ok(())
    }

    async fn delete(&self, _module: SyncModule, _id: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        let inquiries: Vec<ContactInquiry> = read_json(self.storage.as_ref(), keys::INQUIRIES)
            .map_err(storage_failure)?
            .unwrap_or_default();
        let appointments: Vec<Appointment> =
            read_json(self.storage.as_ref(), keys::APPOINTMENTS)
                .map_err(storage_failure)?
                .unwrap_or_default();
        let matches = self.read_list(keys::MANUAL_MATCHES)?;

        let resolved = inquiries
            .iter()
            .filter(|i| i.status == Status::Resolved)
            .count();
        let rate = if inquiries.is_empty() {
            0
        } else {
            (resolved * 100 + inquiries.len() / 2) / inquiries.len()
        };

        Ok(DashboardStats {
            total_inquiries: inquiries.len() as u64,
            active_appointments: appointments
                .iter()
                .filter(|a| a.status == Status::Scheduled)
                .count() as u64,
            teacher_requests: matches.len() as u64,
            resolution_rate: format!("{rate}%"),
        })
    }

    async fn chat(&self, _prompt: &str, _context: &str) -> ApiResult<String> {
        Ok(LOCAL_CHAT_NOTICE.to_string())
    }

    async fn analyze(&self, _message: &str) -> ApiResult<String> {
        Err(ApiError::Backend(
            "inquiry analysis needs a backend connection".to_string(),
        ))
    }

    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let registered: Option<AdminUser> =
            read_json(self.storage.as_ref(), keys::USER_DB).map_err(storage_failure)?;

        let user = match registered {
            Some(user) if user.email == email && user.password.as_deref() == Some(password) => {
                user
            }
            _ if email == DEMO_ADMIN_EMAIL && password == DEMO_ADMIN_PASSWORD => {
                Self::demo_admin(email)
            }
            _ => {
                return Err(ApiError::AuthFailed(
                    "Invalid administrative credentials".to_string(),
                ));
            }
        };

        Ok(LoginResponse {
            token: format!("local-{}", uuid::Uuid::now_v7()),
            user,
        })
    }

    async fn signup(&self, name: &str, email: &str, password: &str) -> ApiResult<()> {
        let user = AdminUser {
            name: name.to_string(),
            email: email.to_string(),
            phone: String::new(),
            avatar: avatar_for(name),
            password: Some(password.to_string()),
        };
        write_json(self.storage.as_ref(), keys::USER_DB, &user).map_err(storage_failure)
    }
}
