//! Sync error types.

use thiserror::Error;
use tutordesk_api::ApiError;
use tutordesk_storage::StorageError;

/// Result type for admin core operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced by the admin core.
///
/// None of these are fatal; every failure leaves the store as it was before
/// the operation started.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("invalid record from backend: {0}")]
    InvalidRecord(#[from] serde_json::Error),

    #[error("{module} record not found: {id}")]
    NotFound { module: &'static str, id: String },

    #[error("not signed in")]
    NotAuthenticated,
}

impl SyncError {
    /// Message suitable for showing next to the failed action.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Input rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Please enter a valid business email address")]
    InvalidEmail,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Operation Restricted: Academic Profile must be finalized before marking a session as Completed.")]
    ProfileNotFinalized,

    #[error("Academic profile is incomplete: {0}")]
    IncompleteProfile(&'static str),

    #[error("Incorrect password. Access denied.")]
    IncorrectPassword,
}
