//! Activity log, chat transcript and scalar settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Severity of an activity log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Info,
    Warning,
}

/// One entry of the append-only activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemLog {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub activity: String,
    pub admin: String,
    pub status: LogStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Ai,
}

/// One turn of the AI assistant transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Ai,
            text: text.into(),
        }
    }
}

/// The signed-in administrator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdminUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Age horizon for automatic cleanup, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum RetentionPeriod {
    OneWeek,
    #[default]
    TwoWeeks,
    ThreeWeeks,
}

impl RetentionPeriod {
    pub fn days(&self) -> u32 {
        match self {
            RetentionPeriod::OneWeek => 7,
            RetentionPeriod::TwoWeeks => 14,
            RetentionPeriod::ThreeWeeks => 21,
        }
    }

    pub fn as_duration(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.days()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("retention period must be 7, 14 or 21 days, got {0}")]
pub struct InvalidRetentionPeriod(pub u32);

impl TryFrom<u32> for RetentionPeriod {
    type Error = InvalidRetentionPeriod;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            7 => Ok(RetentionPeriod::OneWeek),
            14 => Ok(RetentionPeriod::TwoWeeks),
            21 => Ok(RetentionPeriod::ThreeWeeks),
            other => Err(InvalidRetentionPeriod(other)),
        }
    }
}

impl From<RetentionPeriod> for u32 {
    fn from(period: RetentionPeriod) -> Self {
        period.days()
    }
}

impl fmt::Display for RetentionPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days", self.days())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Aggregate counts shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_inquiries: u64,
    pub active_appointments: u64,
    pub teacher_requests: u64,
    /// Already formatted by the backend, e.g. `"87%"`.
    pub resolution_rate: String,
}
