//! State loading operations.

use std::fs;
use std::path::Path;

use tds_model::ApplicationState;

use crate::error::{PersistenceError, Result};

/// Load and validate a state document.
///
/// A document that parses but fails whole-tree validation is rejected the
/// same way as one that does not parse.
pub fn load_state(path: &Path) -> Result<ApplicationState> {
    let bytes = fs::read(path).map_err(|e| PersistenceError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })?;

    let state: ApplicationState =
        serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Deserialization {
            path: path.to_path_buf(),
            source,
        })?;

    state.validate().map_err(|source| PersistenceError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        path = %path.display(),
        version = state.version,
        drafts = state.drafts.len(),
        "loaded application state"
    );
    Ok(state)
}
