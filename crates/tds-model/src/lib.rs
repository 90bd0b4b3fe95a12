//! Application state schema for Ticket Draft Studio.
//!
//! Defines the persisted state tree and the per-field constraints every
//! mutation is checked against. Used by the state store and the generation
//! orchestrator.
//!
//! # Architecture
//!
//! - `state.rs` - Root [`ApplicationState`] and whole-tree validation
//! - `connections.rs` - Provider connection settings
//! - `generation.rs` - Generation settings and limits
//! - `draft.rs` - Draft artifacts and status transitions
//! - `ui.rs` - UI preferences
//! - `preflight.rs` - Pre-send checklist
//! - `history.rs` - Send batch history
//! - `validate.rs` - Format and range checks
//! - `error.rs` - [`ValidationError`]

mod connections;
mod draft;
mod enums;
mod error;
mod generation;
mod history;
mod preflight;
mod state;
mod ui;
pub mod validate;

pub use connections::{
    ClaudeConnection, ConnectionField, ConnectionsState, FreshserviceConnection,
    MicrosoftConnection, Provider,
};
pub use draft::{Classification, DraftArtifact, NewDraft, tag_body, tag_subject};
pub use enums::{DraftStatus, GenerationMode, Priority, QualityLevel, ThemeMode, TicketType};
pub use error::{Result, ValidationError};
pub use generation::{
    GenerationSettings, GenerationUpdate, MAX_CUSTOM_PROMPT_LEN, MAX_EMAIL_COUNT,
    MAX_TICKET_NUMBER, MAX_WAIT_TIME_MS, MIN_EMAIL_COUNT, validate_email_count,
};
pub use history::{MAX_HISTORY, SendBatchRecord, push_capped};
pub use preflight::{PreflightCheck, PreflightState};
pub use state::{ApplicationState, CURRENT_SCHEMA_VERSION, MigrationMarker};
pub use ui::{UiPreferences, WindowGeometry};
