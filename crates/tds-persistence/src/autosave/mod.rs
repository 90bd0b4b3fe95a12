//! Debounced background saving.
//!
//! Provides:
//! - `AutoSaveConfig` - Debounce and failure backoff settings
//! - `DirtyTracker` - Tracks unsaved changes and retry deadlines
//! - `Saver` - Dedicated thread that performs debounced saves

mod config;
mod saver;
mod tracker;

pub use config::AutoSaveConfig;
pub(crate) use saver::{Saver, SaverMsg};
pub use tracker::DirtyTracker;
