//! Dirty state tracking for auto-save.

use std::time::{Duration, Instant};

use super::AutoSaveConfig;

/// Tracks unsaved changes in the state tree.
///
/// Owned by the saver thread; drives both the debounce timer and the
/// retry schedule after failed writes.
#[derive(Debug, Clone)]
pub struct DirtyTracker {
    /// Whether there are unsaved changes.
    dirty: bool,

    /// When the most recent change was made.
    last_change: Option<Instant>,

    /// When the first unsaved change was made.
    /// Reset when saved.
    first_unsaved_change: Option<Instant>,

    /// Consecutive failed saves.
    failures: u32,

    /// No save is attempted before this instant.
    retry_at: Option<Instant>,
}

impl Default for DirtyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DirtyTracker {
    /// Create a new tracker with no unsaved changes.
    pub fn new() -> Self {
        Self {
            dirty: false,
            last_change: None,
            first_unsaved_change: None,
            failures: 0,
            retry_at: None,
        }
    }

    /// Check if there are unsaved changes.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Consecutive failed saves since the last success.
    #[inline]
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Mark the state as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        let now = Instant::now();
        self.dirty = true;
        self.last_change = Some(now);

        // Only set first_unsaved_change if this is the first change since last save
        if self.first_unsaved_change.is_none() {
            self.first_unsaved_change = Some(now);
        }
    }

    /// Mark that a save has completed successfully.
    pub fn save_complete(&mut self) {
        self.dirty = false;
        self.first_unsaved_change = None;
        self.failures = 0;
        self.retry_at = None;
    }

    /// Mark that a save has failed. The state stays dirty.
    ///
    /// Returns the delay before the next attempt.
    pub fn save_failed(&mut self, config: &AutoSaveConfig) -> Duration {
        self.failures = self.failures.saturating_add(1);
        let delay = config.retry_delay(self.failures);
        self.retry_at = Some(Instant::now() + delay);
        delay
    }

    /// Get milliseconds since the last change.
    pub fn ms_since_last_change(&self) -> Option<u64> {
        self.last_change.map(|t| t.elapsed().as_millis() as u64)
    }

    /// Get milliseconds since the first unsaved change.
    pub fn ms_since_first_unsaved(&self) -> Option<u64> {
        self.first_unsaved_change
            .map(|t| t.elapsed().as_millis() as u64)
    }

    /// Check if auto-save should trigger based on the config.
    pub fn should_auto_save(&self, config: &AutoSaveConfig) -> bool {
        if !self.dirty || !config.enabled {
            return false;
        }
        if self.retry_at.is_some_and(|at| Instant::now() < at) {
            return false;
        }

        match (self.ms_since_last_change(), self.ms_since_first_unsaved()) {
            (Some(since_last), Some(since_first)) => config.should_save(since_last, since_first),
            _ => false,
        }
    }

    /// How long to wait before a save may be due, or `None` if nothing is pending.
    pub fn time_until_due(&self, config: &AutoSaveConfig) -> Option<Duration> {
        if !self.dirty || !config.enabled {
            return None;
        }
        let (Some(last), Some(first)) = (self.last_change, self.first_unsaved_change) else {
            return None;
        };

        let debounce_at = last + Duration::from_millis(config.debounce_ms);
        let forced_at = first + Duration::from_millis(config.max_delay_ms);
        let mut due = debounce_at.min(forced_at);
        if let Some(retry_at) = self.retry_at {
            due = due.max(retry_at);
        }
        Some(due.saturating_duration_since(Instant::now()))
    }
}
