//! Commands against the local backend and an in-memory store.

use clap::Parser;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tutordesk_cli::commands::{Collection, Command, execute};
use tutordesk_cli::{App, AppConfig, Mode};
use tutordesk_storage::{KeyValueStore, MemoryStore};
use tutordesk_sync::local_backend::LOCAL_CHAT_NOTICE;
use tutordesk_sync::{AlwaysConfirm, NeverConfirm};
use tutordesk_types::{RetentionPeriod, Status, Theme};

#[derive(Parser)]
struct Harness {
    #[command(subcommand)]
    command: Command,
}

fn parse(args: &[&str]) -> Result<Command, clap::Error> {
    let argv = std::iter::once("tutordesk").chain(args.iter().copied());
    Harness::try_parse_from(argv).map(|h| h.command)
}

async fn local_app() -> App {
    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let config = AppConfig {
        mode: Mode::Local,
        ..AppConfig::default()
    };
    App::with_storage(config, storage).await.unwrap()
}

async fn run(app: &App, args: &[&str]) -> anyhow::Result<String> {
    execute(app, parse(args)?, &AlwaysConfirm).await
}

// --- Parsing ---

#[test]
fn parses_status_names() {
    match parse(&["status", "101", "Trial Pending"]).unwrap() {
        Command::Status { id, status } => {
            assert_eq!(id, "101");
            assert_eq!(status, Status::TrialPending);
        }
        other => panic!("unexpected command: {other:?}"),
    }
    assert!(parse(&["status", "101", "Done"]).is_err());
}

#[test]
fn retention_days_must_be_supported() {
    match parse(&["retention", "--days", "21"]).unwrap() {
        Command::Retention { days, off } => {
            assert_eq!(days, Some(RetentionPeriod::ThreeWeeks));
            assert!(!off);
        }
        other => panic!("unexpected command: {other:?}"),
    }
    assert!(parse(&["retention", "--days", "10"]).is_err());
    assert!(parse(&["retention", "--days", "7", "--off"]).is_err());
}

#[test]
fn collections_by_name() {
    match parse(&["list", "matches", "--refresh"]).unwrap() {
        Command::List {
            collection,
            refresh,
        } => {
            assert_eq!(collection, Collection::Matches);
            assert!(refresh);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

// --- Auth ---

#[tokio::test]
async fn demo_login_and_logout() {
    let app = local_app().await;
    let out = run(&app, &["login", "--email", "admin@righttutor.com", "--password", "admin123"])
        .await
        .unwrap();
    assert_eq!(out, "Signed in as Default Admin <admin@righttutor.com>");
    assert!(app.session.store().lock().await.is_authenticated());

    run(&app, &["logout"]).await.unwrap();
    assert!(!app.session.store().lock().await.is_authenticated());
}

#[tokio::test]
async fn invalid_login_reports_reason() {
    let app = local_app().await;
    let err = run(&app, &["login", "--email", "nobody", "--password", "admin123"])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Please enter a valid business email address");
}

// --- Records ---

#[tokio::test]
async fn list_shows_seeded_records() {
    let app = local_app().await;
    let out = run(&app, &["list", "inquiries"]).await.unwrap();
    assert!(out.contains("Sarah Johnson"));
    assert!(out.contains("Michael Chen"));
}

#[tokio::test]
async fn create_assigns_id_and_logs() {
    let app = local_app().await;
    let out = run(
        &app,
        &["create", "inquiries", "--json", r#"{"name":"Asha Rao","email":"asha@example.com"}"#],
    )
    .await
    .unwrap();
    let created: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(!created["id"].as_str().unwrap().is_empty());

    let store = app.session.store().lock().await;
    assert_eq!(store.inquiries()[0].name, "Asha Rao");
    assert_eq!(
        store.logs()[0].activity,
        "[LIVE SYNC] Inquiry from Asha Rao recorded and backed up"
    );
}

#[tokio::test]
async fn invalid_json_is_rejected() {
    let app = local_app().await;
    assert!(run(&app, &["create", "inquiries", "--json", "{"]).await.is_err());
}

#[tokio::test]
async fn delete_honours_confirmation() {
    let app = local_app().await;

    let declined = execute(&app, parse(&["delete", "inquiries", "1"]).unwrap(), &NeverConfirm)
        .await
        .unwrap();
    assert_eq!(declined, "Cancelled.");
    assert_eq!(app.session.store().lock().await.inquiries().len(), 2);

    let deleted = run(&app, &["delete", "inquiries", "1"]).await.unwrap();
    assert_eq!(deleted, "Deleted 1.");
    assert_eq!(app.session.store().lock().await.inquiries().len(), 1);
}

#[tokio::test]
async fn completing_unfinalized_appointment_is_refused() {
    let app = local_app().await;
    let err = run(&app, &["status", "101", "Completed"]).await.unwrap_err();
    assert!(err.to_string().starts_with("Operation Restricted"));
}

#[tokio::test]
async fn attend_asks_before_bypassing_profile() {
    let app = local_app().await;
    let out = execute(&app, parse(&["attend", "101"]).unwrap(), &NeverConfirm)
        .await
        .unwrap();
    assert_eq!(out, "Cancelled.");

    run(&app, &["attend", "101"]).await.unwrap();
    let store = app.session.store().lock().await;
    let booking = store.appointments().iter().find(|a| a.id == "101").unwrap();
    assert_eq!(booking.status, Status::Completed);
}

// --- Assistant and settings ---

#[tokio::test]
async fn chat_offline_returns_notice() {
    let app = local_app().await;
    let out = run(&app, &["chat", "Any gaps on Friday?"]).await.unwrap();
    assert_eq!(out, LOCAL_CHAT_NOTICE);
    assert!(!app.session.store().lock().await.chat().has_unread());
}

#[tokio::test]
async fn analyze_offline_falls_back() {
    let app = local_app().await;
    let out = run(&app, &["analyze", "Need a maths tutor"]).await.unwrap();
    assert_eq!(out, "AI analysis unavailable.");
}

#[tokio::test]
async fn stats_from_local_storage() {
    let app = local_app().await;
    let out = run(&app, &["stats"]).await.unwrap();
    let stats: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(stats["totalInquiries"], 2);
    assert_eq!(stats["resolutionRate"], "50%");
}

#[tokio::test]
async fn retention_and_cleanup() {
    let app = local_app().await;
    let out = run(&app, &["retention", "--days", "7"]).await.unwrap();
    assert_eq!(
        out,
        "Retention enabled (7 days). Removed 0 logs and 0 repositories."
    );

    let logs = run(&app, &["logs"]).await.unwrap();
    assert!(logs.contains("Updated Data Retention: Active (7 days)"));

    let out = run(&app, &["cleanup"]).await.unwrap();
    assert_eq!(out, "Removed 1 log entries.");
    assert!(app.session.store().lock().await.logs().is_empty());
}

#[tokio::test]
async fn theme_toggles() {
    let app = local_app().await;
    assert_eq!(run(&app, &["theme"]).await.unwrap(), "Theme: dark");
    assert_eq!(app.session.store().lock().await.theme(), Theme::Dark);
    assert_eq!(run(&app, &["theme"]).await.unwrap(), "Theme: light");
}
