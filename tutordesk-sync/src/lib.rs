//! TutorDesk admin core.
//!
//! - [`Store`]: in-memory collections and settings, written through to a
//!   [`tutordesk_storage::KeyValueStore`] on every mutation
//! - [`AdminSession`]: calls the backend first and reflects acknowledged
//!   results in the store
//! - [`PushDispatcher`]: re-fetches a module when the backend announces a
//!   change
//! - [`RetentionScheduler`]: periodic age-based cleanup
//! - [`LocalBackend`]: offline stand-in for the REST backend

pub mod chat;
pub mod confirm;
pub mod dispatcher;
pub mod error;
pub mod local_backend;
pub mod retention;
pub mod session;
pub mod store;
pub mod validation;

pub use chat::{ChatPhase, ChatState};
pub use confirm::{AlwaysConfirm, Confirmer, NeverConfirm, Outcome};
pub use dispatcher::PushDispatcher;
pub use error::{SyncError, SyncResult, ValidationError};
pub use local_backend::LocalBackend;
pub use retention::{CleanupReport, RetentionScheduler};
pub use session::AdminSession;
pub use store::{RetentionSetting, Store, Tracked};
