//! Shared helpers for admin core tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as TokioMutex;
use tutordesk_api::types::LoginResponse;
use tutordesk_api::{ApiError, ApiResult, Backend};
use tutordesk_storage::{KeyValueStore, MemoryStore};
use tutordesk_sync::{AdminSession, Store};
use tutordesk_types::{
    AdminUser, Appointment, ContactInquiry, DashboardStats, LogStatus, MatchProfile, Repository,
    RepositoryCategory, Status, SyncModule, SystemLog, Urgency,
};

/// Scripted backend that records every call it receives.
#[derive(Default)]
pub struct StubBackend {
    state: Mutex<StubState>,
}

#[derive(Default)]
struct StubState {
    calls: Vec<String>,
    lists: HashMap<SyncModule, Result<Vec<Value>, String>>,
    create_reply: Option<Value>,
    failure: Option<String>,
    chat_reply: Option<Result<String, String>>,
    analyze_reply: Option<Result<String, String>>,
    stats: Option<DashboardStats>,
    chat_stalls: bool,
    token: Option<String>,
    next_id: u32,
}

impl StubBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with<R>(&self, f: impl FnOnce(&mut StubState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn calls(&self) -> Vec<String> {
        self.with(|s| s.calls.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.with(|s| s.token.clone())
    }

    /// Drops the token as a process restart would.
    pub fn set_access_token_sync(&self, token: Option<String>) {
        self.with(|s| s.token = token);
    }

    pub fn set_list(&self, module: SyncModule, items: Vec<Value>) {
        self.with(|s| s.lists.insert(module, Ok(items)));
    }

    pub fn fail_list(&self, module: SyncModule, message: &str) {
        self.with(|s| s.lists.insert(module, Err(message.to_string())));
    }

    /// Next create returns exactly this payload.
    pub fn reply_to_create(&self, value: Value) {
        self.with(|s| s.create_reply = Some(value));
    }

    /// Every mutating call fails with `message`.
    pub fn fail_mutations(&self, message: &str) {
        self.with(|s| s.failure = Some(message.to_string()));
    }

    pub fn reply_to_chat(&self, reply: Result<&str, &str>) {
        let reply = reply.map(str::to_string).map_err(str::to_string);
        self.with(|s| s.chat_reply = Some(reply));
    }

    /// Chat requests never complete.
    pub fn stall_chat(&self, stalls: bool) {
        self.with(|s| s.chat_stalls = stalls);
    }

    pub fn reply_to_analyze(&self, reply: Result<&str, &str>) {
        let reply = reply.map(str::to_string).map_err(str::to_string);
        self.with(|s| s.analyze_reply = Some(reply));
    }

    pub fn set_stats(&self, stats: DashboardStats) {
        self.with(|s| s.stats = Some(stats));
    }

    fn record(&self, call: String) -> ApiResult<()> {
        self.with(|s| {
            s.calls.push(call);
            match &s.failure {
                Some(message) => Err(ApiError::Backend(message.clone())),
                None => Ok(()),
            }
        })
    }
}

#[async_trait]
impl Backend for StubBackend {
    async fn set_access_token(&self, token: Option<String>) {
        self.with(|s| s.token = token);
    }

    async fn list(&self, module: SyncModule) -> ApiResult<Vec<Value>> {
        self.with(|s| {
            s.calls.push(format!("list {module}"));
            match s.lists.get(&module) {
                Some(Ok(items)) => Ok(items.clone()),
                Some(Err(message)) => Err(ApiError::Backend(message.clone())),
                None => Ok(Vec::new()),
            }
        })
    }

    async fn create(&self, module: SyncModule, body: &Value) -> ApiResult<Value> {
        self.record(format!("create {module}"))?;
        self.with(|s| {
            if let Some(reply) = s.create_reply.take() {
                return Ok(reply);
            }
            s.next_id += 1;
            let mut echo = body.clone();
            echo["id"] = json!(format!("stub-{}", s.next_id));
            Ok(echo)
        })
    }

    async fn update(&self, module: SyncModule, id: &str, _body: &Value) -> ApiResult<()> {
        self.record(format!("update {module} {id}"))
    }

    async fn delete(&self, module: SyncModule, id: &str) -> ApiResult<()> {
        self.record(format!("delete {module} {id}"))
    }

    async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        self.with(|s| {
            s.calls.push("stats".to_string());
            s.stats
                .clone()
                .ok_or_else(|| ApiError::Backend("stats offline".to_string()))
        })
    }

    async fn chat(&self, prompt: &str, _context: &str) -> ApiResult<String> {
        if self.with(|s| s.chat_stalls) {
            self.with(|s| s.calls.push(format!("chat {prompt}")));
            return std::future::pending().await;
        }
        self.with(|s| {
            s.calls.push(format!("chat {prompt}"));
            match s.chat_reply.clone() {
                Some(Ok(text)) => Ok(text),
                Some(Err(message)) => Err(ApiError::Backend(message)),
                None => Ok(String::new()),
            }
        })
    }

    async fn analyze(&self, _message: &str) -> ApiResult<String> {
        self.with(|s| {
            s.calls.push("analyze".to_string());
            match s.analyze_reply.clone() {
                Some(Ok(text)) => Ok(text),
                Some(Err(message)) => Err(ApiError::Backend(message)),
                None => Ok(String::new()),
            }
        })
    }

    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        self.record(format!("login {email}"))
            .map_err(|e| ApiError::AuthFailed(e.user_message()))?;
        if password != "secret1" {
            return Err(ApiError::AuthFailed("Invalid credentials".into()));
        }
        Ok(LoginResponse {
            token: "tok-1".into(),
            user: admin_user("Priya Admin"),
        })
    }

    async fn signup(&self, _name: &str, email: &str, _password: &str) -> ApiResult<()> {
        self.record(format!("signup {email}"))
    }
}

pub fn memory() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::new())
}

/// A store over empty memory (seeded with the example data).
pub fn store() -> Store {
    Store::load(memory()).unwrap()
}

pub fn session(backend: Arc<StubBackend>) -> (AdminSession, Arc<TokioMutex<Store>>) {
    let store = Arc::new(TokioMutex::new(store()));
    (AdminSession::new(backend, store.clone()), store)
}

pub fn admin_user(name: &str) -> AdminUser {
    AdminUser {
        name: name.into(),
        email: "priya@example.com".into(),
        phone: String::new(),
        avatar: String::new(),
        password: None,
    }
}

pub fn inquiry(id: &str, name: &str) -> ContactInquiry {
    ContactInquiry {
        id: id.into(),
        name: name.into(),
        email: "t@example.com".into(),
        phone: None,
        subject: "Tour".into(),
        message: "hi".into(),
        date: "2024-06-01".into(),
        status: Status::Pending,
    }
}

pub fn appointment(id: &str, parent: &str) -> Appointment {
    Appointment {
        id: id.into(),
        parent_name: parent.into(),
        child_name: "Kid".into(),
        email: String::new(),
        phone: "555-0100".into(),
        date: "2024-06-02".into(),
        time: "10:00 AM".into(),
        topic: "General Consultation".into(),
        status: Status::Scheduled,
        match_profile: None,
    }
}

pub fn complete_profile() -> MatchProfile {
    MatchProfile {
        selected_class: "Grade 8".into(),
        subjects: ["Mathematics".to_string()].into_iter().collect(),
        is_manual_subject: false,
        manual_subject_name: None,
        urgency: Urgency::High,
        deadline: "2024-07-01".into(),
        parent_budget: "500/hr".into(),
        is_finalized: false,
    }
}

pub fn repository(id: &str, name: &str, created_at: DateTime<Utc>) -> Repository {
    Repository {
        id: id.into(),
        name: name.into(),
        url: format!("https://sheets.example.com/{id}"),
        category: RepositoryCategory::Inquiries,
        assigned_to: "Ops".into(),
        last_sync: "Never".into(),
        created_at,
    }
}

pub fn log_at(id: &str, timestamp: DateTime<Utc>) -> SystemLog {
    SystemLog {
        id: id.into(),
        timestamp,
        activity: format!("activity {id}"),
        admin: "Admin".into(),
        status: LogStatus::Info,
    }
}
