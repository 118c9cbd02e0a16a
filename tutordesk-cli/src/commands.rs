//! One subcommand per session operation.
//!
//! Every command returns the text to print so it can be exercised without a
//! terminal.

use crate::app::App;
use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Write as _;
use tutordesk_sync::{Confirmer, Outcome, SyncError};
use tutordesk_types::{
    Appointment, ContactInquiry, ManualMatch, MatchProfile, Repository, RetentionPeriod, Status,
    SyncModule,
};

/// Record collection named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Collection {
    Inquiries,
    Appointments,
    Matches,
    Repositories,
}

impl From<Collection> for SyncModule {
    fn from(collection: Collection) -> Self {
        match collection {
            Collection::Inquiries => SyncModule::Contacts,
            Collection::Appointments => SyncModule::Bookings,
            Collection::Matches => SyncModule::ManualMatches,
            Collection::Repositories => SyncModule::Repositories,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and keep the session for later commands
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Register a new administrator
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out, keeping cached records
    Logout,
    /// Delete the signed-in account
    DeleteAccount {
        #[arg(long)]
        password: String,
    },
    /// Print a collection
    List {
        collection: Collection,
        /// Fetch from the backend first
        #[arg(long)]
        refresh: bool,
    },
    /// Re-fetch every collection from the backend
    Refresh,
    /// Create a record from a JSON object
    Create {
        collection: Collection,
        #[arg(long)]
        json: String,
    },
    /// Replace a record with a JSON object carrying its id
    Update {
        collection: Collection,
        #[arg(long)]
        json: String,
    },
    /// Delete a record
    Delete { collection: Collection, id: String },
    /// Change an appointment's status
    Status {
        id: String,
        /// e.g. "Scheduled", "Completed", "Cancelled"
        #[arg(value_parser = parse_status)]
        status: Status,
    },
    /// Mark an appointment attended, or undo it
    Attend {
        id: String,
        #[arg(long)]
        undo: bool,
    },
    /// Save an appointment's match profile
    Profile {
        id: String,
        #[arg(long)]
        json: String,
        #[arg(long)]
        finalize: bool,
    },
    /// Ask the AI assistant
    Chat { message: String },
    /// Reset the assistant transcript
    ChatReset,
    /// Analyze an inquiry message
    Analyze { message: String },
    /// Print dashboard stats
    Stats,
    /// Print the activity log
    Logs,
    /// Configure automatic cleanup
    Retention {
        /// 7, 14 or 21
        #[arg(long, value_parser = parse_period, conflicts_with = "off")]
        days: Option<RetentionPeriod>,
        #[arg(long)]
        off: bool,
    },
    /// Purge the whole activity log
    Cleanup,
    /// Switch between light and dark theme
    Theme,
}

fn parse_status(s: &str) -> Result<Status, String> {
    s.parse().map_err(|e: tutordesk_types::UnknownStatus| e.to_string())
}

fn parse_period(s: &str) -> Result<RetentionPeriod, String> {
    let days: u32 = s.parse().map_err(|_| format!("not a number of days: '{s}'"))?;
    RetentionPeriod::try_from(days).map_err(|e| e.to_string())
}

fn parse_json<T: DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).context("invalid record JSON")
}

fn friendly(e: SyncError) -> anyhow::Error {
    anyhow::anyhow!(e.user_message())
}

fn render<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn declined<T>(outcome: Outcome<T>, done: impl FnOnce(T) -> Result<String>) -> Result<String> {
    match outcome {
        Outcome::Done(value) => done(value),
        Outcome::Declined => Ok("Cancelled.".to_string()),
    }
}

/// Runs one command against `app`.
pub async fn execute(app: &App, command: Command, confirmer: &dyn Confirmer) -> Result<String> {
    let session = &app.session;

    match command {
        Command::Login { email, password } => {
            let user = session
                .login(&email, &password)
                .await
                .map_err(friendly)?;
            Ok(format!("Signed in as {} <{}>", user.name, user.email))
        }
        Command::Signup {
            name,
            email,
            password,
        } => {
            session
                .signup(&name, &email, &password)
                .await
                .map_err(friendly)?;
            Ok(format!("Registered {email}. You can now sign in."))
        }
        Command::Logout => {
            session.logout().await?;
            Ok("Signed out.".to_string())
        }
        Command::DeleteAccount { password } => {
            let outcome = session
                .delete_account(&password, confirmer)
                .await
                .map_err(friendly)?;
            declined(outcome, |()| Ok("Account deleted.".to_string()))
        }
        Command::List {
            collection,
            refresh,
        } => {
            if refresh {
                session.refresh(collection.into()).await?;
            }
            list(app, collection).await
        }
        Command::Refresh => {
            session.refresh_all().await?;
            Ok("All collections refreshed.".to_string())
        }
        Command::Create { collection, json } => match collection {
            Collection::Inquiries => render(&session.create_inquiry(parse_json(&json)?).await?),
            Collection::Appointments => {
                render(&session.create_appointment(parse_json(&json)?).await?)
            }
            Collection::Matches => render(&session.create_manual_match(parse_json(&json)?).await?),
            Collection::Repositories => {
                render(&session.create_repository(parse_json(&json)?).await?)
            }
        },
        Command::Update { collection, json } => match collection {
            Collection::Inquiries => render(&session.update_inquiry(parse_json(&json)?).await?),
            Collection::Appointments => {
                render(&session.update_appointment(parse_json(&json)?).await?)
            }
            Collection::Matches => render(&session.update_manual_match(parse_json(&json)?).await?),
            Collection::Repositories => {
                render(&session.update_repository(parse_json(&json)?).await?)
            }
        },
        Command::Delete { collection, id } => {
            let deleted = match collection {
                Collection::Inquiries => session.delete_inquiry(&id, confirmer).await?.done().is_some(),
                Collection::Appointments => {
                    session.delete_appointment(&id, confirmer).await?.done().is_some()
                }
                Collection::Matches => {
                    session.delete_manual_match(&id, confirmer).await?.done().is_some()
                }
                Collection::Repositories => {
                    session.delete_repository(&id, confirmer).await?.done().is_some()
                }
            };
            Ok(if deleted {
                format!("Deleted {id}.")
            } else {
                "Cancelled.".to_string()
            })
        }
        Command::Status { id, status } => {
            let appointment = session
                .set_appointment_status(&id, status)
                .await
                .map_err(friendly)?;
            render(&appointment)
        }
        Command::Attend { id, undo } => {
            let outcome = session.mark_attended(&id, !undo, confirmer).await?;
            declined(outcome, |a: Appointment| render(&a))
        }
        Command::Profile { id, json, finalize } => {
            let profile: MatchProfile = parse_json(&json)?;
            let appointment = session
                .save_match_profile(&id, profile, finalize)
                .await
                .map_err(friendly)?;
            render(&appointment)
        }
        Command::Chat { message } => {
            session.store().lock().await.set_draft(message)?;
            if !session.submit_chat().await? {
                return Ok("The assistant is busy or the message was empty.".to_string());
            }
            let mut store = session.store().lock().await;
            store.mark_read()?;
            Ok(store
                .chat()
                .messages()
                .last()
                .map(|m| m.text.clone())
                .unwrap_or_default())
        }
        Command::ChatReset => {
            session.store().lock().await.reset_chat()?;
            Ok("Chat history cleared.".to_string())
        }
        Command::Analyze { message } => Ok(session.analyze_inquiry(&message).await),
        Command::Stats => match session.dashboard_stats().await {
            Some(stats) => render(&stats),
            None => Ok("Dashboard stats are unavailable.".to_string()),
        },
        Command::Logs => {
            let store = session.store().lock().await;
            let mut out = String::new();
            for log in store.logs() {
                writeln!(
                    out,
                    "{} [{:?}] {} ({})",
                    log.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    log.status,
                    log.activity,
                    log.admin
                )?;
            }
            Ok(out)
        }
        Command::Retention { days, off } => {
            let current = session.store().lock().await.retention();
            let period = days.unwrap_or(current.period);
            let report = session.configure_retention(!off, period).await?;
            let mut out = if off {
                "Retention disabled.".to_string()
            } else {
                format!("Retention enabled ({period}).")
            };
            if let Some(report) = report {
                write!(
                    out,
                    " Removed {} logs and {} repositories.",
                    report.logs_removed, report.repositories_removed
                )?;
            }
            Ok(out)
        }
        Command::Cleanup => {
            let outcome = session.run_manual_cleanup(confirmer).await?;
            declined(outcome, |n| Ok(format!("Removed {n} log entries.")))
        }
        Command::Theme => {
            let theme = session.store().lock().await.toggle_theme()?;
            Ok(format!("Theme: {}", theme.as_str()))
        }
    }
}

async fn list(app: &App, collection: Collection) -> Result<String> {
    let store = app.session.store().lock().await;
    match collection {
        Collection::Inquiries => render(&store.records::<ContactInquiry>()),
        Collection::Appointments => render(&store.records::<Appointment>()),
        Collection::Matches => render(&store.records::<ManualMatch>()),
        Collection::Repositories => render(&store.records::<Repository>()),
    }
}
