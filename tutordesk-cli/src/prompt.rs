//! Terminal confirmation.

use std::io::{BufRead, Write};
use tutordesk_sync::Confirmer;

/// Asks on stderr and reads the answer from stdin, unless `--yes` was given.
pub struct PromptConfirmer {
    assume_yes: bool,
}

impl PromptConfirmer {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirmer for PromptConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let mut stderr = std::io::stderr();
        if write!(stderr, "{prompt} [y/N] ").and_then(|()| stderr.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
