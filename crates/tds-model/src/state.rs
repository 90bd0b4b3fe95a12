//! Root application state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::connections::ConnectionsState;
use crate::draft::{DraftArtifact, NewDraft};
use crate::error::{Result, ValidationError};
use crate::generation::{GenerationSettings, MAX_TICKET_NUMBER};
use crate::history::{MAX_HISTORY, SendBatchRecord};
use crate::preflight::PreflightState;
use crate::ui::UiPreferences;

/// Current state document schema version.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Records whether the legacy flat configuration has been imported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationMarker {
    pub legacy_imported: bool,
    pub imported_at: Option<DateTime<Utc>>,
}

/// Root application state.
///
/// This is the document persisted to `appstate.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationState {
    /// Schema version (for future migrations).
    pub version: u32,

    /// When the tree was last mutated.
    pub last_modified: DateTime<Utc>,

    /// Set after onboarding completes.
    #[serde(default)]
    pub first_run_complete: bool,

    #[serde(default)]
    pub connections: ConnectionsState,

    #[serde(default)]
    pub generation: GenerationSettings,

    /// Drafts in generation order.
    #[serde(default)]
    pub drafts: Vec<DraftArtifact>,

    /// Pre-send checklist.
    #[serde(default)]
    pub preflight: PreflightState,

    #[serde(default)]
    pub ui: UiPreferences,

    /// Send batch history, newest last.
    #[serde(default)]
    pub history: Vec<SendBatchRecord>,

    #[serde(default)]
    pub migration: MigrationMarker,
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            last_modified: Utc::now(),
            first_run_complete: false,
            connections: ConnectionsState::default(),
            generation: GenerationSettings::default(),
            drafts: Vec::new(),
            preflight: PreflightState::default(),
            ui: UiPreferences::default(),
            history: Vec::new(),
            migration: MigrationMarker::default(),
        }
    }
}

impl ApplicationState {
    /// Update the last modified timestamp.
    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }

    /// Look up a draft by id.
    pub fn draft(&self, id: u64) -> Option<&DraftArtifact> {
        self.drafts.iter().find(|d| d.id == id)
    }

    /// Look up a draft by id for mutation.
    pub fn draft_mut(&mut self, id: u64) -> Option<&mut DraftArtifact> {
        self.drafts.iter_mut().find(|d| d.id == id)
    }

    /// Assign the next ticket number to `draft` and append it.
    ///
    /// The counter is advanced in the same call as the push, so a copy of
    /// the tree never holds one without the other.
    pub fn allocate_draft(&mut self, draft: NewDraft) -> Result<&DraftArtifact> {
        draft.validate()?;
        let id = self.generation.next_ticket_number;
        if id >= MAX_TICKET_NUMBER {
            return Err(ValidationError::Invariant(
                "ticket numbers exhausted".to_string(),
            ));
        }
        self.generation.next_ticket_number = id + 1;
        self.drafts.push(draft.into_artifact(id));
        Ok(&self.drafts[self.drafts.len() - 1])
    }

    /// Ids the next `count` appends would receive, without reserving them.
    pub fn peek_ids(&self, count: u32) -> impl Iterator<Item = u64> {
        let start = self.generation.next_ticket_number;
        start..start.saturating_add(u64::from(count))
    }

    /// Validate the whole tree.
    ///
    /// Used on load: a document that fails here is treated as corrupt.
    pub fn validate(&self) -> Result<()> {
        if self.version == 0 || self.version > CURRENT_SCHEMA_VERSION {
            return Err(ValidationError::Invariant(format!(
                "unsupported schema version {} (maximum {CURRENT_SCHEMA_VERSION})",
                self.version
            )));
        }
        self.connections.validate()?;
        self.generation.validate()?;
        self.ui.validate()?;
        self.preflight.validate()?;

        let mut previous: Option<u64> = None;
        for draft in &self.drafts {
            if previous.is_some_and(|p| draft.id <= p) {
                return Err(ValidationError::Invariant(format!(
                    "draft ids not strictly increasing at {}",
                    draft.id
                )));
            }
            draft.validate()?;
            previous = Some(draft.id);
        }
        if let Some(max_id) = previous
            && self.generation.next_ticket_number <= max_id
        {
            return Err(ValidationError::Invariant(format!(
                "next_ticket_number {} does not exceed highest draft id {max_id}",
                self.generation.next_ticket_number
            )));
        }

        if self.history.len() > MAX_HISTORY {
            return Err(ValidationError::Invariant(format!(
                "history holds {} records (maximum {MAX_HISTORY})",
                self.history.len()
            )));
        }
        for record in &self.history {
            record.validate()?;
        }
        Ok(())
    }
}
