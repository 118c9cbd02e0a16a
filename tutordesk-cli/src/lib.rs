//! TutorDesk admin console.

pub mod app;
pub mod commands;
pub mod config;
pub mod prompt;
pub mod watch;

pub use app::App;
pub use commands::{Collection, Command};
pub use config::{AppConfig, Mode};
