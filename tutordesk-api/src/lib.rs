//! Clients for the TutorDesk admin backend.
//!
//! The admin core treats the backend as an external collaborator reached
//! through two channels:
//! - A REST API with a `{ success, data | message }` envelope ([`ApiClient`])
//! - A Socket.IO push channel announcing which module changed ([`PushSubscriber`])
//!
//! The core depends only on the [`Backend`] trait so the REST client can be
//! swapped for a local-only implementation or a test stub.

pub mod api_client;
pub mod backend;
pub mod config;
pub mod error;
pub mod push;
pub mod types;

pub use api_client::ApiClient;
pub use backend::Backend;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use push::{PushSignal, PushSubscriber};
pub use types::LoginResponse;
