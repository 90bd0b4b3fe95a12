//! Store configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::autosave::AutoSaveConfig;
use crate::paths::default_state_dir;

/// Configuration for a [`StateStore`](crate::StateStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding `appstate.json` and its backup.
    pub state_dir: PathBuf,

    /// Legacy flat configuration imported on first start, if present.
    #[serde(default)]
    pub legacy_path: Option<PathBuf>,

    #[serde(default)]
    pub autosave: AutoSaveConfig,
}

impl StoreConfig {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            state_dir: state_dir.as_ref().to_path_buf(),
            legacy_path: None,
            autosave: AutoSaveConfig::default(),
        }
    }

    /// Config rooted at the per-user config directory.
    pub fn default_location() -> Option<Self> {
        default_state_dir().map(Self::new)
    }

    #[must_use]
    pub fn with_legacy_path(mut self, path: impl AsRef<Path>) -> Self {
        self.legacy_path = Some(path.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn with_autosave(mut self, autosave: AutoSaveConfig) -> Self {
        self.autosave = autosave;
        self
    }
}
