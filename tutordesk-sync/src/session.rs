//! Admin session - the pessimistic mutation controller.
//!
//! Every mutation goes to the backend first; the store only changes after the
//! backend acknowledges. A failed call leaves the store untouched. The store
//! lock is never held across a backend call.

use crate::chat::{ANALYSIS_EMPTY, ANALYSIS_UNAVAILABLE};
use crate::confirm::{Confirmer, Outcome};
use crate::error::{SyncError, SyncResult, ValidationError};
use crate::retention::CleanupReport;
use crate::store::{Store, Tracked};
use crate::validation;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use tutordesk_api::{ApiError, Backend};
use tutordesk_types::{
    AdminUser, Appointment, ContactInquiry, DashboardStats, LogStatus, ManualMatch, MatchProfile,
    Repository, RetentionPeriod, Status, SyncModule,
};

/// Password of the built-in demo administrator.
pub const DEMO_ADMIN_PASSWORD: &str = "admin123";

const PAGE_ACTOR: &str = "Admin";

const FINALIZE_BYPASS_PROMPT: &str = "Academic profile is not finalized. Mark as attended anyway?";
const MANUAL_CLEANUP_PROMPT: &str =
    "This will permanently delete ALL logs. This action cannot be undone. Continue?";
const DELETE_ACCOUNT_PROMPT: &str = "Permanently delete this administrator account?";

/// Drives backend calls and reflects acknowledged results in the store.
pub struct AdminSession {
    backend: Arc<dyn Backend>,
    store: Arc<Mutex<Store>>,
}

/// Overlays the backend's response onto the body that was sent, so an echo
/// that carries only the identifier still yields the full record.
fn merge_response(mut sent: Value, received: Value) -> Value {
    match (&mut sent, received) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                if !value.is_null() {
                    base.insert(key, value);
                }
            }
            sent
        }
        (_, received) => received,
    }
}

/// Puts the chat back to idle when a turn is dropped before its reply is
/// recorded, e.g. by a caller-side timeout.
struct ChatTurn {
    store: Arc<Mutex<Store>>,
    settled: bool,
}

impl Drop for ChatTurn {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        if let Ok(mut store) = self.store.try_lock() {
            store.abandon_chat_turn();
        } else if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let store = self.store.clone();
            runtime.spawn(async move { store.lock().await.abandon_chat_turn() });
        }
    }
}

impl AdminSession {
    pub fn new(backend: Arc<dyn Backend>, store: Arc<Mutex<Store>>) -> Self {
        Self { backend, store }
    }

    pub fn store(&self) -> &Arc<Mutex<Store>> {
        &self.store
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    // ── Fetch ──

    /// Re-fetches one module from the backend.
    ///
    /// A failed fetch counts as an empty snapshot, and an empty snapshot
    /// never replaces the cached collection. Returns the number of records
    /// now cached from the fetch.
    pub async fn refresh(&self, module: SyncModule) -> SyncResult<usize> {
        match module {
            SyncModule::Contacts => self.refresh_records::<ContactInquiry>().await,
            SyncModule::Bookings => self.refresh_records::<Appointment>().await,
            SyncModule::ManualMatches => self.refresh_records::<ManualMatch>().await,
            SyncModule::Repositories => self.refresh_records::<Repository>().await,
        }
    }

    pub async fn refresh_all(&self) -> SyncResult<()> {
        for module in SyncModule::ALL {
            self.refresh(module).await?;
        }
        Ok(())
    }

    async fn refresh_records<T: Tracked>(&self) -> SyncResult<usize> {
        let raw = match self.backend.list(T::MODULE).await {
            Ok(items) => items,
            Err(e) => {
                warn!("fetching {} failed, keeping cached copy: {e}", T::MODULE);
                Vec::new()
            }
        };

        let records: Vec<T> = raw
            .into_iter()
            .filter_map(|value| match T::from_backend(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("skipping malformed {} record: {e}", T::MODULE);
                    None
                }
            })
            .collect();

        if records.is_empty() {
            debug!("{} snapshot empty, cache untouched", T::MODULE);
            return Ok(0);
        }

        let count = records.len();
        self.store.lock().await.replace_all(records)?;
        debug!("{} refreshed with {count} records", T::MODULE);
        Ok(count)
    }

    // ── Generic mutations ──

    async fn create_record<T: Tracked>(&self, record: T) -> SyncResult<T> {
        let body = record.to_backend()?;
        let saved = self.backend.create(T::MODULE, &body).await?;
        let created = T::from_backend(merge_response(body, saved))?;
        if created.id().is_empty() {
            return Err(ApiError::UnexpectedResponse(format!(
                "created {} record has no id",
                T::MODULE
            ))
            .into());
        }

        let mut store = self.store.lock().await;
        store.add(created.clone())?;
        // Read back what the store kept (repositories are stamped on insert)
        Ok(store.find::<T>(created.id()).cloned().unwrap_or(created))
    }

    async fn update_record<T: Tracked>(&self, record: T) -> SyncResult<T> {
        let body = record.to_backend()?;
        self.backend.update(T::MODULE, record.id(), &body).await?;
        self.store.lock().await.update(record.clone())?;
        Ok(record)
    }

    async fn delete_record<T: Tracked>(
        &self,
        id: &str,
        confirmer: &dyn Confirmer,
    ) -> SyncResult<Outcome<T>> {
        let existing = self.cached::<T>(id).await?;
        if !confirmer.confirm(&existing.delete_prompt()) {
            return Ok(Outcome::Declined);
        }

        self.backend.delete(T::MODULE, id).await?;
        let removed = self.store.lock().await.remove::<T>(id)?;
        Ok(Outcome::Done(removed.unwrap_or(existing)))
    }

    async fn cached<T: Tracked>(&self, id: &str) -> SyncResult<T> {
        self.store
            .lock()
            .await
            .find::<T>(id)
            .cloned()
            .ok_or_else(|| SyncError::NotFound {
                module: T::MODULE.as_str(),
                id: id.to_string(),
            })
    }

    // ── Inquiries ──

    pub async fn create_inquiry(&self, inquiry: ContactInquiry) -> SyncResult<ContactInquiry> {
        validation::validate_inquiry(&inquiry)?;
        self.create_record(inquiry).await
    }

    pub async fn update_inquiry(&self, inquiry: ContactInquiry) -> SyncResult<ContactInquiry> {
        self.update_record(inquiry).await
    }

    pub async fn delete_inquiry(
        &self,
        id: &str,
        confirmer: &dyn Confirmer,
    ) -> SyncResult<Outcome<ContactInquiry>> {
        self.delete_record(id, confirmer).await
    }

    // ── Appointments ──

    pub async fn create_appointment(&self, appointment: Appointment) -> SyncResult<Appointment> {
        validation::validate_booking(&appointment)?;
        self.create_record(appointment).await
    }

    /// Full record update. Completion requires a finalized profile.
    pub async fn update_appointment(&self, appointment: Appointment) -> SyncResult<Appointment> {
        validation::ensure_completion_allowed(&appointment)?;
        self.update_record(appointment).await
    }

    pub async fn delete_appointment(
        &self,
        id: &str,
        confirmer: &dyn Confirmer,
    ) -> SyncResult<Outcome<Appointment>> {
        self.delete_record(id, confirmer).await
    }

    pub async fn set_appointment_status(&self, id: &str, status: Status) -> SyncResult<Appointment> {
        let mut appointment = self.cached::<Appointment>(id).await?;
        appointment.status = status;
        self.update_appointment(appointment).await
    }

    /// Toggles attendance.
    ///
    /// Marking an appointment whose profile is not finalized asks for
    /// confirmation first; unmarking returns it to Scheduled.
    pub async fn mark_attended(
        &self,
        id: &str,
        attended: bool,
        confirmer: &dyn Confirmer,
    ) -> SyncResult<Outcome<Appointment>> {
        let mut appointment = self.cached::<Appointment>(id).await?;
        let bypass = attended && !appointment.is_profile_finalized();
        if bypass && !confirmer.confirm(FINALIZE_BYPASS_PROMPT) {
            return Ok(Outcome::Declined);
        }

        appointment.status = if attended {
            Status::Completed
        } else {
            Status::Scheduled
        };
        self.update_record(appointment).await.map(Outcome::Done)
    }

    /// Saves the match profile, finalizing it when asked.
    ///
    /// The profile is only validated when finalizing; drafts may be partial.
    pub async fn save_match_profile(
        &self,
        id: &str,
        mut profile: MatchProfile,
        finalize: bool,
    ) -> SyncResult<Appointment> {
        if finalize {
            validation::validate_profile_for_finalize(&profile)?;
        }
        let mut appointment = self.cached::<Appointment>(id).await?;
        profile.is_finalized = finalize;
        appointment.match_profile = Some(profile);
        self.update_record(appointment).await
    }

    // ── Manual matches ──

    pub async fn create_manual_match(&self, record: ManualMatch) -> SyncResult<ManualMatch> {
        validation::validate_manual_match(&record)?;
        self.create_record(record).await
    }

    pub async fn update_manual_match(&self, record: ManualMatch) -> SyncResult<ManualMatch> {
        self.update_record(record).await
    }

    pub async fn delete_manual_match(
        &self,
        id: &str,
        confirmer: &dyn Confirmer,
    ) -> SyncResult<Outcome<ManualMatch>> {
        self.delete_record(id, confirmer).await
    }

    // ── Repositories ──

    pub async fn create_repository(&self, repository: Repository) -> SyncResult<Repository> {
        validation::validate_repository(&repository)?;
        self.create_record(repository).await
    }

    pub async fn update_repository(&self, repository: Repository) -> SyncResult<Repository> {
        self.update_record(repository).await
    }

    pub async fn delete_repository(
        &self,
        id: &str,
        confirmer: &dyn Confirmer,
    ) -> SyncResult<Outcome<Repository>> {
        self.delete_record(id, confirmer).await
    }

    // ── Authentication ──

    pub async fn login(&self, email: &str, password: &str) -> SyncResult<AdminUser> {
        validation::validate_credentials(email, password)?;
        let session = self.backend.login(email, password).await?;
        self.backend.set_access_token(Some(session.token.clone())).await;

        let mut store = self.store.lock().await;
        store.set_access_token(Some(session.token))?;
        store.set_user(session.user.clone())?;
        store.set_authenticated(true)?;
        info!("signed in as {}", session.user.email);
        Ok(session.user)
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> SyncResult<()> {
        validation::validate_signup(name, email, password)?;
        self.backend.signup(name, email, password).await?;
        info!("registered administrator {email}");
        Ok(())
    }

    pub async fn logout(&self) -> SyncResult<()> {
        self.backend.set_access_token(None).await;
        self.store.lock().await.logout()?;
        info!("signed out");
        Ok(())
    }

    /// Re-attaches a persisted token to the backend. Returns whether a
    /// session was restored.
    pub async fn restore(&self) -> bool {
        let token = {
            let store = self.store.lock().await;
            if !store.is_authenticated() {
                return false;
            }
            store.access_token().map(str::to_string)
        };
        let restored = token.is_some();
        self.backend.set_access_token(token).await;
        restored
    }

    /// Deletes the signed-in account after checking its password.
    pub async fn delete_account(
        &self,
        password: &str,
        confirmer: &dyn Confirmer,
    ) -> SyncResult<Outcome<()>> {
        let stored_password = {
            let store = self.store.lock().await;
            if !store.is_authenticated() {
                return Err(SyncError::NotAuthenticated);
            }
            store.user().and_then(|u| u.password.clone())
        };

        let matches_account = stored_password.as_deref() == Some(password);
        if password != DEMO_ADMIN_PASSWORD && !matches_account {
            return Err(ValidationError::IncorrectPassword.into());
        }
        if !confirmer.confirm(DELETE_ACCOUNT_PROMPT) {
            return Ok(Outcome::Declined);
        }

        self.logout().await?;
        Ok(Outcome::Done(()))
    }

    // ── Assistant ──

    /// Sends the current draft as one chat turn.
    ///
    /// Returns `false` without doing anything when a turn is already in
    /// flight or the draft is blank. Failures end up in the transcript.
    /// Dropping the future mid-request leaves the chat idle again, with the
    /// user turn kept and no reply.
    pub async fn submit_chat(&self) -> SyncResult<bool> {
        let (prompt, context) = {
            let mut store = self.store.lock().await;
            let Some(prompt) = store.begin_chat_turn()? else {
                return Ok(false);
            };
            (prompt, store.chat_context())
        };
        let mut turn = ChatTurn {
            store: self.store.clone(),
            settled: false,
        };

        let reply = self.backend.chat(&prompt, &context).await;
        let mut store = self.store.lock().await;
        turn.settled = true;
        store.finish_chat_turn(reply)?;
        Ok(true)
    }

    /// Free-text analysis of an inquiry. Never fails.
    pub async fn analyze_inquiry(&self, message: &str) -> String {
        match self.backend.analyze(message).await {
            Ok(text) if text.trim().is_empty() => ANALYSIS_EMPTY.to_string(),
            Ok(text) => text,
            Err(e) => {
                warn!("inquiry analysis failed: {e}");
                ANALYSIS_UNAVAILABLE.to_string()
            }
        }
    }

    pub async fn dashboard_stats(&self) -> Option<DashboardStats> {
        match self.backend.dashboard_stats().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!("dashboard stats unavailable: {e}");
                None
            }
        }
    }

    // ── Retention ──

    /// Applies a retention setting and records the change.
    ///
    /// Turning retention on runs one cleanup pass straight away.
    pub async fn configure_retention(
        &self,
        enabled: bool,
        period: RetentionPeriod,
    ) -> SyncResult<Option<CleanupReport>> {
        let mut store = self.store.lock().await;
        let was_enabled = store.retention().enabled;
        store.set_retention(enabled, period)?;

        let activity = if enabled {
            format!("Updated Data Retention: Active ({} days)", period.days())
        } else {
            "Updated Data Retention: Inactive".to_string()
        };
        let admin = store.user().map_or(PAGE_ACTOR, |u| u.name.as_str()).to_string();
        store.append_log(activity, admin, LogStatus::Info)?;

        if enabled && !was_enabled {
            return Ok(store.run_auto_cleanup()?);
        }
        Ok(None)
    }

    pub async fn run_manual_cleanup(&self, confirmer: &dyn Confirmer) -> SyncResult<Outcome<usize>> {
        if !confirmer.confirm(MANUAL_CLEANUP_PROMPT) {
            return Ok(Outcome::Declined);
        }
        let removed = self.store.lock().await.run_manual_cleanup()?;
        Ok(Outcome::Done(removed))
    }
}
