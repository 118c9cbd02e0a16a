//! Inquiries, appointments, manual matches and repository links.

use crate::module::SyncModule;
use crate::record::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle status shared by every record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Pending,
    Resolved,
    Scheduled,
    Completed,
    Cancelled,
    Processing,
    #[serde(rename = "Trial Pending")]
    TrialPending,
    Assigned,
    Dropped,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Pending => "Pending",
            Status::Resolved => "Resolved",
            Status::Scheduled => "Scheduled",
            Status::Completed => "Completed",
            Status::Cancelled => "Cancelled",
            Status::Processing => "Processing",
            Status::TrialPending => "Trial Pending",
            Status::Assigned => "Assigned",
            Status::Dropped => "Dropped",
        };
        f.write_str(s)
    }
}

/// A status string no [`Status`] variant matches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

impl Status {
    pub const ALL: [Status; 9] = [
        Status::Pending,
        Status::Resolved,
        Status::Scheduled,
        Status::Completed,
        Status::Cancelled,
        Status::Processing,
        Status::TrialPending,
        Status::Assigned,
        Status::Dropped,
    ];
}

fn status_token(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Case, spacing and separators are ignored: `"trial_pending"` parses as
/// [`Status::TrialPending`].
impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = status_token(s);
        Status::ALL
            .into_iter()
            .find(|status| status_token(&status.to_string()) == token)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

fn default_status_pending() -> Status {
    Status::Pending
}

fn default_status_scheduled() -> Status {
    Status::Scheduled
}

fn fill(field: &mut String, fallback: &str) {
    if field.trim().is_empty() {
        *field = fallback.to_string();
    }
}

/// A contact message from a prospective client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInquiry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub date: String,
    #[serde(default = "default_status_pending")]
    pub status: Status,
}

impl Record for ContactInquiry {
    const MODULE: SyncModule = SyncModule::Contacts;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn normalize(&mut self) {
        fill(&mut self.name, "Unknown");
        fill(&mut self.subject, "General Inquiry");
        if self.date.trim().is_empty() {
            self.date = Utc::now().date_naive().to_string();
        }
    }
}

/// Academic requirements captured for an appointment.
///
/// An appointment may only be marked completed once its profile is
/// finalized.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchProfile {
    #[serde(default)]
    pub selected_class: String,
    #[serde(default)]
    pub subjects: BTreeSet<String>,
    #[serde(default)]
    pub is_manual_subject: bool,
    #[serde(default)]
    pub manual_subject_name: Option<String>,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub parent_budget: String,
    #[serde(default)]
    pub is_finalized: bool,
}

/// A scheduled consultation with a parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub parent_name: String,
    #[serde(default)]
    pub child_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default = "default_status_scheduled")]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_profile: Option<MatchProfile>,
}

impl Appointment {
    pub fn is_profile_finalized(&self) -> bool {
        self.match_profile.as_ref().is_some_and(|p| p.is_finalized)
    }
}

impl Record for Appointment {
    const MODULE: SyncModule = SyncModule::Bookings;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.parent_name
    }

    // The booking intake form posts `name`; older records only carry that.
    fn prepare(value: &mut Value) {
        if let Value::Object(map) = value {
            let has_parent = map
                .get("parentName")
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty());
            if !has_parent {
                if let Some(name) = map.get("name").cloned() {
                    map.insert("parentName".to_string(), name);
                }
            }
        }
    }

    fn normalize(&mut self) {
        fill(&mut self.parent_name, "Unknown");
        fill(&mut self.child_name, "Intake Pending");
        fill(&mut self.phone, "N/A");
        fill(&mut self.topic, "General Consultation");
    }
}

/// A tutor pairing entered directly by staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualMatch {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub parent_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub grade_level: String,
    #[serde(default = "default_status_pending")]
    pub status: Status,
    #[serde(default)]
    pub date_added: String,
}

impl Record for ManualMatch {
    const MODULE: SyncModule = SyncModule::ManualMatches;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.parent_name
    }
}

/// Which collection a linked spreadsheet mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RepositoryCategory {
    #[default]
    Inquiries,
    Bookings,
    #[serde(rename = "Manual Matches")]
    ManualMatches,
}

/// A link to an external spreadsheet.
///
/// `created_at` drives retention pruning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub category: RepositoryCategory,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default)]
    pub last_sync: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Record for Repository {
    const MODULE: SyncModule = SyncModule::Repositories;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}
