//! File I/O for the state document.
//!
//! This module handles:
//! - Saving with temp file, backup rotation and atomic rename
//! - Loading with parse and whole-tree validation

mod load;
mod save;

pub use load::load_state;
pub use save::{remove_state_files, save_state};
