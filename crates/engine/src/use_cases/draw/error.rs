//! Draw errors and command outcomes.

use luckydraw_domain::{DomainError, DrawStatus};

/// Why a lifecycle command or feed event was rejected.
///
/// Every variant leaves the engine exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    #[error("Not enough people: {available} eligible, {required} required")]
    Capacity { available: usize, required: usize },
    #[error("Prize {prize} has no slots left")]
    Exhausted { prize: String },
    #[error("No prize selected")]
    NoPrizeSelected,
    #[error("Malformed feed event: {0}")]
    MalformedEvent(String),
    #[error("Engine already torn down")]
    ResourceTeardown,
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl DrawError {
    pub fn capacity(available: usize, required: usize) -> Self {
        Self::Capacity {
            available,
            required,
        }
    }

    pub fn exhausted(prize: impl Into<String>) -> Self {
        Self::Exhausted {
            prize: prize.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEvent(reason.into())
    }
}

/// Result of a command that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    /// Dropped without effect
    Ignored(IgnoredReason),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    /// Another transition holds the lock
    Locked,
    /// The command has no meaning in this status
    WrongState(DrawStatus),
}
