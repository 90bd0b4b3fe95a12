//! State file locations.
//!
//! The state lives in the platform-specific application data folder:
//! - macOS: ~/Library/Application Support/com.TicketDraftStudio.TDS/
//! - Windows: %APPDATA%/TicketDraftStudio/TDS/config/
//! - Linux: ~/.config/tds/

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "TicketDraftStudio";
const APP_NAME: &str = "TDS";

/// Primary state file name.
pub const PRIMARY_FILENAME: &str = "appstate.json";
/// Backup state file name (previous primary).
pub const BACKUP_FILENAME: &str = "appstate.backup.json";
/// Unusable primary moved aside during backup recovery.
pub const CORRUPT_FILENAME: &str = "appstate.corrupt.json";
const TEMP_FILENAME: &str = "appstate.json.tmp";

/// Default state directory.
///
/// Returns `None` if the platform-specific directory cannot be determined.
pub fn default_state_dir() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Paths of the files owned by the store's save routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    pub dir: PathBuf,
    pub primary: PathBuf,
    pub backup: PathBuf,
    pub temp: PathBuf,
    pub corrupt: PathBuf,
}

impl StatePaths {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            primary: dir.join(PRIMARY_FILENAME),
            backup: dir.join(BACKUP_FILENAME),
            temp: dir.join(TEMP_FILENAME),
            corrupt: dir.join(CORRUPT_FILENAME),
            dir,
        }
    }
}
