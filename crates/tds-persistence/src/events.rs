//! Change notifications delivered to store subscribers.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::PersistenceError;

/// Part of the state tree touched by a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subtree {
    Connections,
    Generation,
    Drafts,
    Preflight,
    UiPreferences,
    History,
    Onboarding,
    /// The whole tree was replaced (load, migration, reset).
    All,
}

impl Subtree {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connections => "connections",
            Self::Generation => "generation",
            Self::Drafts => "drafts",
            Self::Preflight => "preflight",
            Self::UiPreferences => "ui",
            Self::History => "history",
            Self::Onboarding => "onboarding",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Subtree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Event delivered to every subscriber.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// A mutation succeeded.
    Changed(Subtree),

    /// The primary file was unusable and the backup was restored.
    CorruptionRecovered { backup: PathBuf },

    /// A save failed. The state is kept in memory and the save is retried.
    PersistenceWarning(Arc<PersistenceError>),
}

impl StoreEvent {
    /// The subtree named by a `Changed` event.
    pub fn subtree(&self) -> Option<Subtree> {
        match self {
            Self::Changed(subtree) => Some(*subtree),
            _ => None,
        }
    }
}
