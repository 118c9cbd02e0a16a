//! AI assistant transcript state.

use tutordesk_types::{AdminUser, ChatMessage, Repository, SystemLog};

pub const GREETING: &str =
    "Hello! I can help you summarize calls, find tutors, or check schedule gaps. What do you need?";

/// Stands in for an empty assistant reply.
pub const EMPTY_REPLY: &str = "I'm ready to assist. Please ask your question again.";

/// Appended as the assistant turn when a request fails.
pub const FAILED_REPLY: &str = "Network timeout. Retrieval failed.";

pub const ANALYSIS_UNAVAILABLE: &str = "AI analysis unavailable.";
pub const ANALYSIS_EMPTY: &str = "Unable to generate analysis.";

/// Number of recent log activities sent as assistant context.
const CONTEXT_ACTIVITY_COUNT: usize = 3;

/// Request lifecycle of the assistant panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatPhase {
    #[default]
    Idle,
    /// A request is in flight; new submissions are ignored.
    Generating,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatState {
    pub(crate) draft: String,
    pub(crate) messages: Vec<ChatMessage>,
    pub(crate) phase: ChatPhase,
    pub(crate) has_unread: bool,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            draft: String::new(),
            messages: greeting(),
            phase: ChatPhase::Idle,
            has_unread: false,
        }
    }
}

impl ChatState {
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn is_generating(&self) -> bool {
        self.phase == ChatPhase::Generating
    }

    pub fn has_unread(&self) -> bool {
        self.has_unread
    }
}

/// A fresh transcript: just the assistant greeting.
pub fn greeting() -> Vec<ChatMessage> {
    vec![ChatMessage::ai(GREETING)]
}

/// Context block sent along with every prompt.
pub fn build_context(
    user: Option<&AdminUser>,
    repositories: &[Repository],
    logs: &[SystemLog],
) -> String {
    let admin = user.map_or("Unknown", |u| u.name.as_str());
    let repos = repositories
        .iter()
        .map(|r| r.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let activity = logs
        .iter()
        .take(CONTEXT_ACTIVITY_COUNT)
        .map(|l| l.activity.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    format!("Admin Name: {admin}\nActive Repositories: {repos}\nRecent Activity: {activity}")
}

/// The transcript text for a finished request.
pub(crate) fn reply_or_fallback<E: std::fmt::Display>(reply: &Result<String, E>) -> &str {
    match reply {
        Ok(text) if text.trim().is_empty() => EMPTY_REPLY,
        Ok(text) => text,
        Err(_) => FAILED_REPLY,
    }
}
