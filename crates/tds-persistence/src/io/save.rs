//! State saving operations.

use std::fs::{self, File};
use std::io::Write;

use tds_model::ApplicationState;

use crate::error::{PersistenceError, Result};
use crate::paths::StatePaths;

/// Save the state document.
///
/// Writes a temp file, copies the current primary over the backup, then
/// renames the temp file over the primary. A crash at any point leaves
/// either the old or the new primary in place.
pub fn save_state(state: &ApplicationState, paths: &StatePaths) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(state)
        .map_err(|source| PersistenceError::Serialization { source })?;

    fs::create_dir_all(&paths.dir).map_err(|e| PersistenceError::Io {
        operation: "create directory",
        path: paths.dir.clone(),
        source: e,
    })?;

    let mut file = File::create(&paths.temp).map_err(|e| PersistenceError::Io {
        operation: "create",
        path: paths.temp.clone(),
        source: e,
    })?;

    file.write_all(&bytes).map_err(|e| PersistenceError::Io {
        operation: "write",
        path: paths.temp.clone(),
        source: e,
    })?;

    file.sync_all().map_err(|e| PersistenceError::Io {
        operation: "sync",
        path: paths.temp.clone(),
        source: e,
    })?;
    drop(file);

    if paths.primary.exists() {
        fs::copy(&paths.primary, &paths.backup).map_err(|e| PersistenceError::Io {
            operation: "back up",
            path: paths.backup.clone(),
            source: e,
        })?;
    }

    fs::rename(&paths.temp, &paths.primary).map_err(|e| PersistenceError::AtomicWriteFailed {
        temp_path: paths.temp.clone(),
        target_path: paths.primary.clone(),
        source: e,
    })?;

    tracing::debug!(
        path = %paths.primary.display(),
        drafts = state.drafts.len(),
        "saved application state"
    );
    Ok(())
}

/// Delete the primary, backup and any leftover temp file.
pub fn remove_state_files(paths: &StatePaths) -> Result<()> {
    for path in [&paths.primary, &paths.backup, &paths.temp] {
        match fs::remove_file(path) {
            Ok(()) => tracing::info!(path = %path.display(), "removed state file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(PersistenceError::Io {
                    operation: "delete",
                    path: path.clone(),
                    source: e,
                });
            }
        }
    }
    Ok(())
}
