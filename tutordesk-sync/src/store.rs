//! Local state store.
//!
//! The single source of truth for every collection and setting during a
//! session. Each mutation writes through the [`KeyValueStore`] first and only
//! then commits in memory, so a failed write leaves the in-memory state as it
//! was.
//!
//! Tracked collections (inquiries, appointments, manual matches, repositories)
//! share one generic add / update / remove / replace shape via [`Tracked`].
//! Every add, update and remove appends exactly one `[LIVE SYNC]` audit entry;
//! bulk replacement never logs.

use crate::chat::{self, ChatPhase, ChatState};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use tutordesk_storage::{KeyValueStore, StorageError, StorageResult, keys, read_json, write_json};
use tutordesk_types::fixtures;
use tutordesk_types::{
    AdminUser, Appointment, ChatMessage, ContactInquiry, LogStatus, ManualMatch, Record,
    Repository, RetentionPeriod, SyncModule, SystemLog, Theme,
};

/// Maximum number of log entries written to storage.
pub const LOG_PERSIST_CAP: usize = 100;

/// Actor recorded on audit entries when nobody is signed in.
pub const AUTOMATED_ACTOR: &str = "Automated Sync";

const LIVE_SYNC_PREFIX: &str = "[LIVE SYNC]";

/// Storage key of a synchronized collection.
pub const fn storage_key(module: SyncModule) -> &'static str {
    match module {
        SyncModule::Contacts => keys::INQUIRIES,
        SyncModule::Bookings => keys::APPOINTMENTS,
        SyncModule::ManualMatches => keys::MANUAL_MATCHES,
        SyncModule::Repositories => keys::REPOSITORIES,
    }
}

/// Automatic cleanup configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetentionSetting {
    pub enabled: bool,
    pub period: RetentionPeriod,
}

mod sealed {
    pub trait Slot: Sized {
        fn slot(store: &super::Store) -> &Vec<Self>;
        fn slot_mut(store: &mut super::Store) -> &mut Vec<Self>;
    }
}

/// A record kind with its own collection in the store and its own audit
/// wording.
pub trait Tracked: Record + sealed::Slot {
    const STORAGE_KEY: &'static str = storage_key(Self::MODULE);

    fn added_message(&self) -> String;
    fn updated_message(&self) -> String;
    fn removed_message(&self) -> String;

    /// Question asked before the record is deleted.
    fn delete_prompt(&self) -> String;

    /// Adjusts a record as it enters the collection.
    fn on_insert(&mut self, _now: DateTime<Utc>) {}

    /// JSON body sent to the backend.
    fn to_backend(&self) -> serde_json::Result<Value> {
        let mut body = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut body {
            if map.get("id").and_then(Value::as_str) == Some("") {
                map.remove("id");
            }
        }
        Ok(body)
    }
}

impl sealed::Slot for ContactInquiry {
    fn slot(store: &Store) -> &Vec<Self> {
        &store.inquiries
    }
    fn slot_mut(store: &mut Store) -> &mut Vec<Self> {
        &mut store.inquiries
    }
}

impl Tracked for ContactInquiry {
    fn added_message(&self) -> String {
        format!("Inquiry from {} recorded and backed up", self.label())
    }
    fn updated_message(&self) -> String {
        format!("Status update for inquiry {} mirrored", self.label())
    }
    fn removed_message(&self) -> String {
        format!("Deleted inquiry record: {}", self.label())
    }
    fn delete_prompt(&self) -> String {
        format!("Are you sure you want to delete the inquiry from {}?", self.label())
    }
}

impl sealed::Slot for Appointment {
    fn slot(store: &Store) -> &Vec<Self> {
        &store.appointments
    }
    fn slot_mut(store: &mut Store) -> &mut Vec<Self> {
        &mut store.appointments
    }
}

impl Tracked for Appointment {
    fn added_message(&self) -> String {
        format!("Booking for {} established and synced", self.label())
    }
    fn updated_message(&self) -> String {
        format!("Match Profile/Status for {} updated", self.label())
    }
    fn removed_message(&self) -> String {
        format!("Appointment for {} deleted from registry", self.label())
    }
    fn delete_prompt(&self) -> String {
        format!("Permanently remove appointment record for {}?", self.label())
    }

    // The consultation endpoint names the parent `name`
    fn to_backend(&self) -> serde_json::Result<Value> {
        let mut body = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut body {
            if map.get("id").and_then(Value::as_str) == Some("") {
                map.remove("id");
            }
            map.insert("name".to_string(), Value::String(self.parent_name.clone()));
        }
        Ok(body)
    }
}

impl sealed::Slot for ManualMatch {
    fn slot(store: &Store) -> &Vec<Self> {
        &store.manual_matches
    }
    fn slot_mut(store: &mut Store) -> &mut Vec<Self> {
        &mut store.manual_matches
    }
}

impl Tracked for ManualMatch {
    fn added_message(&self) -> String {
        format!("Registry record for {} pushed to database", self.label())
    }
    fn updated_message(&self) -> String {
        format!("Updated match details for {} mirrored", self.label())
    }
    fn removed_message(&self) -> String {
        format!("Registry record for {} removed from database", self.label())
    }
    fn delete_prompt(&self) -> String {
        format!("Remove the match request for {}?", self.label())
    }
}

impl sealed::Slot for Repository {
    fn slot(store: &Store) -> &Vec<Self> {
        &store.repositories
    }
    fn slot_mut(store: &mut Store) -> &mut Vec<Self> {
        &mut store.repositories
    }
}

impl Tracked for Repository {
    fn added_message(&self) -> String {
        format!("Repository '{}' mirrored to Sheets", self.label())
    }
    fn updated_message(&self) -> String {
        format!("Updates for repository '{}' pushed to Sheets", self.label())
    }
    fn removed_message(&self) -> String {
        format!("Repository '{}' unlinked and synced", self.label())
    }
    fn delete_prompt(&self) -> String {
        format!("Unlink repository '{}'?", self.label())
    }

    // Retention ages repositories from the moment they were linked here
    fn on_insert(&mut self, now: DateTime<Utc>) {
        self.created_at = now;
    }
}

/// In-memory state of the admin console, written through to storage.
pub struct Store {
    storage: Arc<dyn KeyValueStore>,
    inquiries: Vec<ContactInquiry>,
    appointments: Vec<Appointment>,
    manual_matches: Vec<ManualMatch>,
    repositories: Vec<Repository>,
    logs: Vec<SystemLog>,
    user: Option<AdminUser>,
    authenticated: bool,
    access_token: Option<String>,
    retention: RetentionSetting,
    theme: Theme,
    chat: ChatState,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("inquiries", &self.inquiries.len())
            .field("appointments", &self.appointments.len())
            .field("manual_matches", &self.manual_matches.len())
            .field("repositories", &self.repositories.len())
            .field("logs", &self.logs.len())
            .field("authenticated", &self.authenticated)
            .field("retention", &self.retention)
            .finish_non_exhaustive()
    }
}

/// Reads `key`, treating unparseable content as absent.
fn load_key<T: DeserializeOwned>(storage: &dyn KeyValueStore, key: &str) -> StorageResult<Option<T>> {
    match read_json(storage, key) {
        Err(StorageError::Corrupt { key, source }) => {
            warn!("discarding unreadable value under {key}: {source}");
            Ok(None)
        }
        other => other,
    }
}

/// Reads a collection, seeding it when the key has never been written.
fn load_seeded<T: Serialize + DeserializeOwned>(
    storage: &dyn KeyValueStore,
    key: &str,
    seed: impl FnOnce() -> Vec<T>,
) -> StorageResult<Vec<T>> {
    if let Some(items) = load_key(storage, key)? {
        return Ok(items);
    }
    let items = seed();
    debug!("seeding {key} with {} example records", items.len());
    write_json(storage, key, &items)?;
    Ok(items)
}

impl Store {
    /// Loads every collection and setting from `storage`.
    ///
    /// Inquiries, appointments and manual matches fall back to the example
    /// data when their key is absent; everything else falls back to empty
    /// or default values.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> StorageResult<Self> {
        let kv = storage.as_ref();

        let inquiries = load_seeded(kv, keys::INQUIRIES, fixtures::seed_inquiries)?;
        let appointments = load_seeded(kv, keys::APPOINTMENTS, fixtures::seed_appointments)?;
        let manual_matches = load_seeded(kv, keys::MANUAL_MATCHES, fixtures::seed_manual_matches)?;
        let repositories = load_key(kv, keys::REPOSITORIES)?.unwrap_or_default();
        let logs = load_key(kv, keys::LOGS)?.unwrap_or_default();

        let retention = RetentionSetting {
            enabled: load_key(kv, keys::RETENTION_ENABLED)?.unwrap_or(false),
            period: load_key(kv, keys::RETENTION_DAYS)?.unwrap_or_default(),
        };

        let chat = ChatState {
            draft: load_key(kv, keys::AI_DRAFT)?.unwrap_or_default(),
            messages: load_key(kv, keys::AI_HISTORY)?.unwrap_or_else(chat::greeting),
            phase: ChatPhase::Idle,
            has_unread: load_key(kv, keys::AI_UNREAD)?.unwrap_or(false),
        };

        Ok(Self {
            inquiries,
            appointments,
            manual_matches,
            repositories,
            logs,
            user: load_key(kv, keys::USER)?,
            authenticated: load_key(kv, keys::AUTHENTICATED)?.unwrap_or(false),
            access_token: load_key(kv, keys::ACCESS_TOKEN)?,
            retention,
            theme: load_key(kv, keys::THEME)?.unwrap_or_default(),
            chat,
            storage,
        })
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        write_json(self.storage.as_ref(), key, value)
            .inspect_err(|e| warn!("failed to persist {key}: {e}"))
    }

    fn persist_logs(&self, logs: &[SystemLog]) -> StorageResult<()> {
        let capped = &logs[..logs.len().min(LOG_PERSIST_CAP)];
        self.persist(keys::LOGS, capped)
    }

    // ── Reads ──

    pub fn records<T: Tracked>(&self) -> &[T] {
        T::slot(self)
    }

    pub fn find<T: Tracked>(&self, id: &str) -> Option<&T> {
        T::slot(self).iter().find(|r| r.id() == id)
    }

    pub fn inquiries(&self) -> &[ContactInquiry] {
        &self.inquiries
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn manual_matches(&self) -> &[ManualMatch] {
        &self.manual_matches
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    /// Newest first. May hold more than [`LOG_PERSIST_CAP`] entries.
    pub fn logs(&self) -> &[SystemLog] {
        &self.logs
    }

    pub fn user(&self) -> Option<&AdminUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn retention(&self) -> RetentionSetting {
        self.retention
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn chat(&self) -> &ChatState {
        &self.chat
    }

    /// Name recorded on audit entries.
    pub fn actor(&self) -> &str {
        self.user.as_ref().map_or(AUTOMATED_ACTOR, |u| u.name.as_str())
    }

    // ── Tracked collections ──

    /// Overwrites a collection with a fetched snapshot. Never logs.
    pub fn replace_all<T: Tracked>(&mut self, items: Vec<T>) -> StorageResult<()> {
        self.persist(T::STORAGE_KEY, &items)?;
        *T::slot_mut(self) = items;
        Ok(())
    }

    /// Prepends a record and logs its creation.
    pub fn add<T: Tracked>(&mut self, mut item: T) -> StorageResult<()> {
        item.on_insert(Utc::now());
        let message = item.added_message();

        let current = T::slot(self);
        let mut next = Vec::with_capacity(current.len() + 1);
        next.push(item);
        next.extend(current.iter().cloned());

        self.persist(T::STORAGE_KEY, &next)?;
        *T::slot_mut(self) = next;
        self.live_sync(message, LogStatus::Success)?;
        Ok(())
    }

    /// Replaces the record with the same id in place.
    ///
    /// Returns `false` without touching anything when no record has that id.
    pub fn update<T: Tracked>(&mut self, item: T) -> StorageResult<bool> {
        let Some(index) = T::slot(self).iter().position(|r| r.id() == item.id()) else {
            debug!("update for unknown {} id {}, ignoring", T::MODULE, item.id());
            return Ok(false);
        };
        let message = item.updated_message();

        let mut next = T::slot(self).clone();
        next[index] = item;

        self.persist(T::STORAGE_KEY, &next)?;
        *T::slot_mut(self) = next;
        self.live_sync(message, LogStatus::Success)?;
        Ok(true)
    }

    /// Removes the first record with `id`, logging a warning entry.
    pub fn remove<T: Tracked>(&mut self, id: &str) -> StorageResult<Option<T>> {
        let Some(index) = T::slot(self).iter().position(|r| r.id() == id) else {
            return Ok(None);
        };

        let mut next = T::slot(self).clone();
        let removed = next.remove(index);

        self.persist(T::STORAGE_KEY, &next)?;
        *T::slot_mut(self) = next;
        self.live_sync(removed.removed_message(), LogStatus::Warning)?;
        Ok(Some(removed))
    }

    // ── Activity log ──

    fn live_sync(&mut self, message: String, status: LogStatus) -> StorageResult<SystemLog> {
        let admin = self.actor().to_string();
        self.append_log(format!("{LIVE_SYNC_PREFIX} {message}"), admin, status)
    }

    /// Prepends a new entry. Storage keeps only the newest
    /// [`LOG_PERSIST_CAP`] entries.
    pub fn append_log(
        &mut self,
        activity: impl Into<String>,
        admin: impl Into<String>,
        status: LogStatus,
    ) -> StorageResult<SystemLog> {
        let entry = SystemLog {
            id: uuid::Uuid::now_v7().to_string(),
            timestamp: Utc::now(),
            activity: activity.into(),
            admin: admin.into(),
            status,
        };

        let mut next = Vec::with_capacity(self.logs.len() + 1);
        next.push(entry.clone());
        next.extend(self.logs.iter().cloned());

        self.persist_logs(&next)?;
        self.logs = next;
        Ok(entry)
    }

    pub fn clear_all_logs(&mut self) -> StorageResult<usize> {
        self.persist(keys::LOGS, &[] as &[SystemLog])?;
        let removed = self.logs.len();
        self.logs.clear();
        Ok(removed)
    }

    /// Keeps logs stamped at or after `cutoff`. Returns how many were dropped.
    pub(crate) fn retain_logs_since(&mut self, cutoff: DateTime<Utc>) -> StorageResult<usize> {
        let kept: Vec<SystemLog> = self
            .logs
            .iter()
            .filter(|l| l.timestamp >= cutoff)
            .cloned()
            .collect();
        let removed = self.logs.len() - kept.len();
        self.persist_logs(&kept)?;
        self.logs = kept;
        Ok(removed)
    }

    /// Keeps repositories created at or after `cutoff`.
    pub(crate) fn retain_repositories_since(
        &mut self,
        cutoff: DateTime<Utc>,
    ) -> StorageResult<usize> {
        let kept: Vec<Repository> = self
            .repositories
            .iter()
            .filter(|r| r.created_at >= cutoff)
            .cloned()
            .collect();
        let removed = self.repositories.len() - kept.len();
        self.persist(keys::REPOSITORIES, &kept)?;
        self.repositories = kept;
        Ok(removed)
    }

    // ── Settings ──

    pub fn set_retention(&mut self, enabled: bool, period: RetentionPeriod) -> StorageResult<()> {
        self.persist(keys::RETENTION_ENABLED, &enabled)?;
        self.persist(keys::RETENTION_DAYS, &period)?;
        self.retention = RetentionSetting { enabled, period };
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> StorageResult<Theme> {
        let next = self.theme.toggled();
        self.persist(keys::THEME, &next)?;
        self.theme = next;
        Ok(next)
    }

    pub fn set_user(&mut self, user: AdminUser) -> StorageResult<()> {
        self.persist(keys::USER, &user)?;
        self.user = Some(user);
        Ok(())
    }

    pub fn set_authenticated(&mut self, authenticated: bool) -> StorageResult<()> {
        self.persist(keys::AUTHENTICATED, &authenticated)?;
        self.authenticated = authenticated;
        Ok(())
    }

    pub fn set_access_token(&mut self, token: Option<String>) -> StorageResult<()> {
        match &token {
            Some(t) => self.persist(keys::ACCESS_TOKEN, t)?,
            None => self.storage.remove(keys::ACCESS_TOKEN)?,
        }
        self.access_token = token;
        Ok(())
    }

    /// Ends the session. Collections and the stored profile stay intact.
    pub fn logout(&mut self) -> StorageResult<()> {
        self.storage.remove(keys::AUTHENTICATED)?;
        self.storage.remove(keys::ACCESS_TOKEN)?;
        self.user = None;
        self.authenticated = false;
        self.access_token = None;
        Ok(())
    }

    // ── AI chat ──

    pub fn set_draft(&mut self, text: impl Into<String>) -> StorageResult<()> {
        let text = text.into();
        self.persist(keys::AI_DRAFT, &text)?;
        self.chat.draft = text;
        Ok(())
    }

    fn push_message(&mut self, message: ChatMessage) -> StorageResult<()> {
        let mut next = self.chat.messages.clone();
        next.push(message);
        self.persist(keys::AI_HISTORY, &next)?;
        self.chat.messages = next;
        Ok(())
    }

    pub fn append_user_message(&mut self, text: impl Into<String>) -> StorageResult<()> {
        self.push_message(ChatMessage::user(text))
    }

    pub fn append_ai_message(&mut self, text: impl Into<String>) -> StorageResult<()> {
        self.push_message(ChatMessage::ai(text))
    }

    /// Restores the transcript to the greeting alone.
    pub fn reset_chat(&mut self) -> StorageResult<()> {
        let fresh = chat::greeting();
        self.persist(keys::AI_HISTORY, &fresh)?;
        self.persist(keys::AI_UNREAD, &false)?;
        self.chat.messages = fresh;
        self.chat.has_unread = false;
        Ok(())
    }

    pub fn mark_read(&mut self) -> StorageResult<()> {
        self.set_unread(false)
    }

    pub fn mark_unread(&mut self) -> StorageResult<()> {
        self.set_unread(true)
    }

    fn set_unread(&mut self, unread: bool) -> StorageResult<()> {
        self.persist(keys::AI_UNREAD, &unread)?;
        self.chat.has_unread = unread;
        Ok(())
    }

    /// Starts a chat turn from the current draft.
    ///
    /// Returns the prompt to send, or `None` when a request is already in
    /// flight or the draft is blank. On `Some`, the draft has been cleared,
    /// the user turn appended and the phase is [`ChatPhase::Generating`].
    pub fn begin_chat_turn(&mut self) -> StorageResult<Option<String>> {
        if self.chat.is_generating() || self.chat.draft.trim().is_empty() {
            return Ok(None);
        }
        let prompt = self.chat.draft.clone();
        self.set_draft("")?;
        self.append_user_message(prompt.clone())?;
        self.chat.phase = ChatPhase::Generating;
        Ok(Some(prompt))
    }

    /// Completes the in-flight turn with the assistant reply or a fallback.
    pub fn finish_chat_turn<E: std::fmt::Display>(
        &mut self,
        reply: Result<String, E>,
    ) -> StorageResult<()> {
        self.chat.phase = ChatPhase::Idle;
        if let Err(e) = &reply {
            warn!("assistant request failed: {e}");
        }
        let text = chat::reply_or_fallback(&reply).to_string();
        self.append_ai_message(text)?;
        self.mark_unread()
    }

    /// Drops an in-flight turn without a reply.
    pub(crate) fn abandon_chat_turn(&mut self) {
        if self.chat.is_generating() {
            debug!("chat turn abandoned before a reply arrived");
            self.chat.phase = ChatPhase::Idle;
        }
    }

    /// Context sent along with a chat prompt.
    pub fn chat_context(&self) -> String {
        chat::build_context(self.user.as_ref(), &self.repositories, &self.logs)
    }
}
