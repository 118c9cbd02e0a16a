//! Domain records for the TutorDesk admin core.
//!
//! Every collection the admin console works with is defined here:
//! - Contact inquiries, appointments (with their match profile), manual
//!   tutor matches and repository sheet links, all implementing [`Record`]
//! - The append-only activity log and the AI chat transcript
//! - Scalar settings (retention horizon, theme, signed-in admin)
//!
//! Records travel over the wire as camelCase JSON, the same shape they are
//! persisted in locally.

mod entities;
pub mod fixtures;
mod module;
mod record;
mod settings;

pub use entities::{
    Appointment, ContactInquiry, ManualMatch, MatchProfile, Repository, RepositoryCategory,
    Status, UnknownStatus, Urgency,
};
pub use module::{SyncModule, UnknownModule};
pub use record::Record;
pub use settings::{
    AdminUser, ChatMessage, ChatRole, DashboardStats, InvalidRetentionPeriod, LogStatus,
    RetentionPeriod, SystemLog, Theme,
};
