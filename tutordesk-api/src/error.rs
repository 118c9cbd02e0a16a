//! Backend client error types.

use thiserror::Error;

/// Result type for backend operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the request; carries its `message` verbatim.
    #[error("{0}")]
    Backend(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("push channel error: {0}")]
    Push(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for ApiError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        ApiError::WebSocket(Box::new(err))
    }
}

impl ApiError {
    /// Message suitable for showing next to the failed action.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Backend(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
