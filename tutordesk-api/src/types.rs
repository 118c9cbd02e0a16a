//! Wire types for the REST API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tutordesk_types::AdminUser;

/// Response envelope shared by every endpoint.
///
/// Success is `{ success: true, data }`, failure `{ success: false, message }`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Payload of a successful `auth/login`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AdminUser,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub prompt: &'a str,
    pub context: &'a str,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub message: &'a str,
}

/// Renders a free-text reply payload. Non-string payloads are kept as JSON.
pub fn reply_text(data: Option<Value>) -> String {
    match data {
        Some(Value::String(text)) => text,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
