//! Confirmation gate for destructive actions.

/// Asks the operator before a destructive action proceeds.
pub trait Confirmer: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmer for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Confirms everything. For scripted and non-interactive use.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirmer for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Declines everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

impl Confirmer for NeverConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// Result of a confirmation-gated operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    /// The operator declined; nothing changed.
    Declined,
}

impl<T> Outcome<T> {
    pub fn is_declined(&self) -> bool {
        matches!(self, Outcome::Declined)
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::Declined => None,
        }
    }
}
