mod support;

use pretty_assertions::assert_eq;
use serde_json::json;
use support::*;
use tutordesk_sync::chat::{ANALYSIS_EMPTY, ANALYSIS_UNAVAILABLE};
use tutordesk_sync::{AlwaysConfirm, NeverConfirm, Outcome, SyncError, ValidationError};
use tutordesk_types::{DashboardStats, LogStatus, Status, SyncModule};

// --- Create ---

#[tokio::test]
async fn created_inquiry_lands_first_with_one_success_log() {
    let backend = StubBackend::new();
    backend.reply_to_create(json!({
        "id": "99",
        "name": "Test User",
        "email": "t@example.com",
        "subject": "Tour",
        "message": "hi"
    }));
    let (session, store) = session(backend.clone());

    let mut draft = inquiry("", "Test User");
    draft.phone = None;
    let created = session.create_inquiry(draft).await.unwrap();
    assert_eq!(created.id, "99");

    let store = store.lock().await;
    assert_eq!(store.inquiries().iter().filter(|i| i.id == "99").count(), 1);
    assert_eq!(store.inquiries()[0].id, "99");
    assert_eq!(store.logs().len(), 1);
    assert_eq!(store.logs()[0].status, LogStatus::Success);
    assert!(store.logs()[0].activity.contains("Test User"));
    assert_eq!(backend.calls(), vec!["create contacts"]);
}

#[tokio::test]
async fn identifier_under_ref_is_accepted() {
    let backend = StubBackend::new();
    backend.reply_to_create(json!({ "ref": { "id": "bk-7" }, "name": "Nina Rao" }));
    let (session, store) = session(backend);

    let created = session
        .create_appointment(appointment("", "Nina Rao"))
        .await
        .unwrap();
    assert_eq!(created.id, "bk-7");
    assert_eq!(created.parent_name, "Nina Rao");
    assert_eq!(store.lock().await.appointments()[0].id, "bk-7");
}

#[tokio::test]
async fn identifier_under_underscore_id_is_accepted() {
    let backend = StubBackend::new();
    backend.reply_to_create(json!({
        "_id": "mongo-1",
        "name": "Test User",
        "email": "t@example.com"
    }));
    let (session, store) = session(backend.clone());

    let created = session.create_inquiry(inquiry("", "Test User")).await.unwrap();
    assert_eq!(created.id, "mongo-1");

    let store = store.lock().await;
    assert_eq!(store.inquiries()[0].id, "mongo-1");
    assert_eq!(store.inquiries().len(), 3);
    assert_eq!(backend.calls(), vec!["create contacts"]);
}

#[tokio::test]
async fn failed_create_leaves_store_untouched() {
    let backend = StubBackend::new();
    backend.fail_mutations("Email already exists");
    let (session, store) = session(backend);

    let err = session
        .create_inquiry(inquiry("", "Dup"))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Email already exists");

    let store = store.lock().await;
    assert_eq!(store.inquiries().len(), 2);
    assert!(store.logs().is_empty());
}

#[tokio::test]
async fn invalid_input_never_reaches_backend() {
    let backend = StubBackend::new();
    let (session, _store) = session(backend.clone());

    let mut nameless = inquiry("", "");
    nameless.email = "x@example.com".into();
    let err = session.create_inquiry(nameless).await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::Validation(ValidationError::MissingField(_))
    ));

    let mut booking = appointment("", "Nina");
    booking.time = String::new();
    assert!(session.create_appointment(booking).await.is_err());
    assert!(backend.calls().is_empty());
}

// --- Appointment completion ---

#[tokio::test]
async fn completing_unfinalized_appointment_is_rejected_before_network() {
    let backend = StubBackend::new();
    let (session, store) = session(backend.clone());

    let mut appointment = store.lock().await.appointments()[0].clone();
    assert!(!appointment.is_profile_finalized());
    appointment.status = Status::Completed;

    let err = session.update_appointment(appointment).await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::Validation(ValidationError::ProfileNotFinalized)
    ));
    assert!(backend.calls().is_empty());
    assert_eq!(store.lock().await.appointments()[0].status, Status::Scheduled);

    let err = session
        .set_appointment_status("101", Status::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Validation(_)));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn finalized_profile_allows_completion() {
    let backend = StubBackend::new();
    let (session, store) = session(backend.clone());

    let saved = session
        .save_match_profile("101", complete_profile(), true)
        .await
        .unwrap();
    assert!(saved.is_profile_finalized());

    let done = session
        .set_appointment_status("101", Status::Completed)
        .await
        .unwrap();
    assert_eq!(done.status, Status::Completed);
    assert_eq!(store.lock().await.appointments()[0].status, Status::Completed);
    assert_eq!(backend.calls(), vec!["update bookings 101", "update bookings 101"]);
}

#[tokio::test]
async fn finalizing_incomplete_profile_is_rejected() {
    let backend = StubBackend::new();
    let (session, _store) = session(backend.clone());

    let mut profile = complete_profile();
    profile.is_manual_subject = true;
    profile.manual_subject_name = Some("  ".into());
    let err = session
        .save_match_profile("101", profile.clone(), true)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::Validation(ValidationError::IncompleteProfile(_))
    ));
    assert!(backend.calls().is_empty());

    // Drafts are saved without validation and stay unfinalized
    let saved = session.save_match_profile("101", profile, false).await.unwrap();
    assert!(!saved.is_profile_finalized());
}

#[tokio::test]
async fn mark_attended_bypass_needs_confirmation() {
    let backend = StubBackend::new();
    let (session, store) = session(backend.clone());

    let outcome = session.mark_attended("101", true, &NeverConfirm).await.unwrap();
    assert!(outcome.is_declined());
    assert!(backend.calls().is_empty());

    let prompts = std::sync::Mutex::new(Vec::new());
    let record_prompt = |prompt: &str| {
        prompts.lock().unwrap().push(prompt.to_string());
        true
    };
    let marked = session
        .mark_attended("101", true, &record_prompt)
        .await
        .unwrap()
        .done()
        .unwrap();
    assert_eq!(marked.status, Status::Completed);
    assert_eq!(prompts.lock().unwrap().len(), 1);

    let unmarked = session
        .mark_attended("101", false, &NeverConfirm)
        .await
        .unwrap()
        .done()
        .unwrap();
    assert_eq!(unmarked.status, Status::Scheduled);
    assert_eq!(store.lock().await.appointments()[0].status, Status::Scheduled);
}

// --- Update / delete ---

#[tokio::test]
async fn update_reflects_only_after_acknowledgement() {
    let backend = StubBackend::new();
    let (session, store) = session(backend.clone());

    let mut changed = store.lock().await.inquiries()[0].clone();
    changed.status = Status::Resolved;

    backend.fail_mutations("API request failed");
    assert!(session.update_inquiry(changed.clone()).await.is_err());
    assert_eq!(store.lock().await.inquiries()[0].status, Status::Pending);
}

#[tokio::test]
async fn declined_delete_changes_nothing() {
    let backend = StubBackend::new();
    let (session, store) = session(backend.clone());

    let outcome = session.delete_inquiry("1", &NeverConfirm).await.unwrap();
    assert_eq!(outcome, Outcome::Declined);
    assert_eq!(store.lock().await.inquiries().len(), 2);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn confirmed_delete_removes_and_logs_warning() {
    let backend = StubBackend::new();
    let (session, store) = session(backend.clone());

    let removed = session
        .delete_manual_match("m-2", &AlwaysConfirm)
        .await
        .unwrap()
        .done()
        .unwrap();
    assert_eq!(removed.parent_name, "Sneha Kapoor");
    assert_eq!(backend.calls(), vec!["delete manual-matches m-2"]);

    let store = store.lock().await;
    assert_eq!(store.manual_matches().len(), 1);
    assert_eq!(store.logs().len(), 1);
    assert_eq!(store.logs()[0].status, LogStatus::Warning);
}

#[tokio::test]
async fn delete_of_unknown_record_is_not_found() {
    let backend = StubBackend::new();
    let (session, _store) = session(backend.clone());

    let err = session
        .delete_repository("ghost", &AlwaysConfirm)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotFound { .. }));
    assert!(backend.calls().is_empty());
}

// --- Refresh ---

#[tokio::test]
async fn refresh_replaces_with_normalized_snapshot() {
    let backend = StubBackend::new();
    backend.set_list(
        SyncModule::Contacts,
        vec![json!({ "id": 5, "email": "anon@example.com", "name": null })],
    );
    let (session, store) = session(backend);

    assert_eq!(session.refresh(SyncModule::Contacts).await.unwrap(), 1);

    let store = store.lock().await;
    assert_eq!(store.inquiries().len(), 1);
    assert_eq!(store.inquiries()[0].id, "5");
    assert_eq!(store.inquiries()[0].name, "Unknown");
    assert_eq!(store.inquiries()[0].subject, "General Inquiry");
    assert!(store.logs().is_empty());
}

#[tokio::test]
async fn refresh_keeps_records_with_loose_status() {
    let backend = StubBackend::new();
    backend.set_list(
        SyncModule::Contacts,
        vec![
            json!({ "id": "a", "name": "Asha", "status": "pending" }),
            json!({ "id": "b", "name": "Ben", "status": "Pending" }),
            json!({ "id": "c", "name": "Cleo", "status": "archived" }),
        ],
    );
    let (session, store) = session(backend);

    assert_eq!(session.refresh(SyncModule::Contacts).await.unwrap(), 3);

    let store = store.lock().await;
    let ids: Vec<&str> = store.inquiries().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert!(store.inquiries().iter().all(|i| i.status == Status::Pending));
}

#[tokio::test]
async fn failed_or_empty_fetch_keeps_cache() {
    let backend = StubBackend::new();
    backend.fail_list(SyncModule::Bookings, "offline");
    let (session, store) = session(backend);

    assert_eq!(session.refresh(SyncModule::Bookings).await.unwrap(), 0);
    assert_eq!(session.refresh(SyncModule::ManualMatches).await.unwrap(), 0);

    let store = store.lock().await;
    assert_eq!(store.appointments().len(), 2);
    assert_eq!(store.manual_matches().len(), 2);
}

#[tokio::test]
async fn refresh_all_fetches_every_module() {
    let backend = StubBackend::new();
    let (session, _store) = session(backend.clone());
    session.refresh_all().await.unwrap();
    assert_eq!(
        backend.calls(),
        vec![
            "list contacts",
            "list bookings",
            "list manual-matches",
            "list repositories"
        ]
    );
}

// --- Authentication ---

#[tokio::test]
async fn login_stores_session_and_token() {
    let backend = StubBackend::new();
    let (session, store) = session(backend.clone());

    let user = session.login("priya@example.com", "secret1").await.unwrap();
    assert_eq!(user.name, "Priya Admin");
    assert_eq!(backend.token().as_deref(), Some("tok-1"));

    let store = store.lock().await;
    assert!(store.is_authenticated());
    assert_eq!(store.access_token(), Some("tok-1"));
    assert_eq!(store.actor(), "Priya Admin");
}

#[tokio::test]
async fn malformed_credentials_are_rejected_locally() {
    let backend = StubBackend::new();
    let (session, _store) = session(backend.clone());

    let err = session.login("not-an-email", "secret1").await.unwrap_err();
    assert!(matches!(err, SyncError::Validation(ValidationError::InvalidEmail)));

    let err = session.login("priya@example.com", "123").await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::Validation(ValidationError::PasswordTooShort { min: 6 })
    ));

    let err = session
        .signup(" ", "priya@example.com", "secret1")
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Validation(ValidationError::MissingField(_))));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn logout_then_restore() {
    let backend = StubBackend::new();
    let (session, store) = session(backend.clone());

    session.login("priya@example.com", "secret1").await.unwrap();
    backend.set_access_token_sync(None);
    assert!(session.restore().await);
    assert_eq!(backend.token().as_deref(), Some("tok-1"));

    session.logout().await.unwrap();
    assert!(backend.token().is_none());
    assert!(!session.restore().await);
    assert_eq!(store.lock().await.inquiries().len(), 2);
}

#[tokio::test]
async fn delete_account_checks_password_then_confirms() {
    let backend = StubBackend::new();
    let (session, store) = session(backend.clone());

    let err = session
        .delete_account("admin123", &AlwaysConfirm)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotAuthenticated));

    session.login("priya@example.com", "secret1").await.unwrap();

    let err = session
        .delete_account("wrong-pass", &AlwaysConfirm)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::Validation(ValidationError::IncorrectPassword)
    ));

    let declined = session.delete_account("admin123", &NeverConfirm).await.unwrap();
    assert!(declined.is_declined());
    assert!(store.lock().await.is_authenticated());

    let done = session.delete_account("admin123", &AlwaysConfirm).await.unwrap();
    assert_eq!(done, Outcome::Done(()));
    assert!(!store.lock().await.is_authenticated());
}

// --- Dashboard & analysis ---

#[tokio::test]
async fn analysis_fallbacks() {
    let backend = StubBackend::new();
    let (session, _store) = session(backend.clone());

    backend.reply_to_analyze(Ok("Parent wants weekend maths"));
    assert_eq!(session.analyze_inquiry("msg").await, "Parent wants weekend maths");

    backend.reply_to_analyze(Ok(""));
    assert_eq!(session.analyze_inquiry("msg").await, ANALYSIS_EMPTY);

    backend.reply_to_analyze(Err("boom"));
    assert_eq!(session.analyze_inquiry("msg").await, ANALYSIS_UNAVAILABLE);
}

#[tokio::test]
async fn dashboard_stats_degrade_to_none() {
    let backend = StubBackend::new();
    let (session, _store) = session(backend.clone());
    assert_eq!(session.dashboard_stats().await, None);

    let stats = DashboardStats {
        total_inquiries: 4,
        active_appointments: 2,
        teacher_requests: 1,
        resolution_rate: "50%".into(),
    };
    backend.set_stats(stats.clone());
    assert_eq!(session.dashboard_stats().await, Some(stats));
}
