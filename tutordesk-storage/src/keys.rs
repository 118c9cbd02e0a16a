//! Stable storage key names.

pub const INQUIRIES: &str = "rt_inquiries";
pub const APPOINTMENTS: &str = "rt_appointments";
pub const MANUAL_MATCHES: &str = "rt_manual_matches";
pub const REPOSITORIES: &str = "rt_repos";
pub const LOGS: &str = "rt_logs";

pub const USER: &str = "rt_user";
pub const AUTHENTICATED: &str = "rt_auth";
pub const ACCESS_TOKEN: &str = "token";
pub const THEME: &str = "rt_theme";

pub const RETENTION_ENABLED: &str = "rt_retention_enabled";
pub const RETENTION_DAYS: &str = "rt_retention_days";

pub const AI_DRAFT: &str = "rt_ai_draft";
pub const AI_HISTORY: &str = "rt_ai_history";
pub const AI_UNREAD: &str = "rt_ai_unread";

/// Account registered in local-only mode.
pub const USER_DB: &str = "rt_user_db";
