//! Reactive, crash-safe state store for Ticket Draft Studio.
//!
//! The store owns the application state tree, validates every mutation,
//! notifies subscribers synchronously, and persists the tree to disk on a
//! dedicated saver thread.
//!
//! # Features
//!
//! - **Debounced saves** so bursts of edits produce one write
//! - **Atomic writes** (temp file + rename) with a rolling backup
//! - **Recovery** from a corrupt primary file via the backup
//! - **One-time import** of the legacy `KEY=VALUE` configuration
//!
//! # File Layout
//!
//! ```text
//! <config dir>/
//!   appstate.json          current state document
//!   appstate.backup.json   previous state document
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tds_persistence::{StateStore, StoreConfig};
//!
//! let store = StateStore::new(StoreConfig::new("/tmp/tds"));
//! store.subscribe(|event| println!("{event:?}"));
//! let outcome = store.load_or_initialize();
//! store.complete_onboarding()?;
//! store.shutdown_flush()?;
//! ```
//!
//! # Architecture
//!
//! - `store.rs` - [`StateStore`] mutation API, subscribers, load/recovery
//! - `io/` - Save with backup rotation, load with validation
//! - `autosave/` - Debounce config, dirty tracking, saver thread
//! - `legacy.rs` - Legacy flat configuration import
//! - `events.rs` - [`StoreEvent`] notifications
//! - `error.rs` - Error types with user-friendly messages

mod autosave;
mod config;
mod error;
mod events;
mod io;
mod legacy;
mod paths;
mod store;

pub use autosave::{AutoSaveConfig, DirtyTracker};
pub use config::StoreConfig;
pub use error::{PersistenceError, Result, StoreError};
pub use events::{StoreEvent, Subtree};
pub use io::{load_state, remove_state_files, save_state};
pub use legacy::{LEGACY_COUNTER_FILENAME, LegacyConfig, LegacyImport, parse_env};
pub use paths::{BACKUP_FILENAME, CORRUPT_FILENAME, PRIMARY_FILENAME, StatePaths, default_state_dir};
pub use store::{
    LoadOutcome, LoadSource, MigrationOutcome, SaveStats, StateStore, Subscriber, SubscriptionId,
};
