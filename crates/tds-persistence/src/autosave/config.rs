//! Auto-save configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for auto-save behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    /// Whether mutations schedule background saves.
    ///
    /// When disabled the store only writes on explicit flushes.
    pub enabled: bool,

    /// Debounce delay in milliseconds.
    ///
    /// After a change, the saver waits this long before saving.
    /// Additional changes reset the timer.
    pub debounce_ms: u64,

    /// Maximum delay before forcing a save.
    ///
    /// If changes keep coming, save after this many milliseconds
    /// since the first unsaved change.
    pub max_delay_ms: u64,

    /// First retry delay after a failed save.
    pub retry_base_ms: u64,

    /// Upper bound for the retry delay.
    pub retry_max_ms: u64,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 500,
            max_delay_ms: 5_000,
            retry_base_ms: 1_000,
            retry_max_ms: 30_000,
        }
    }
}

impl AutoSaveConfig {
    /// Create a disabled auto-save config.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Check if auto-save should trigger given the time since last change
    /// and time since first unsaved change.
    pub fn should_save(&self, since_last_change_ms: u64, since_first_unsaved_ms: u64) -> bool {
        if !self.enabled {
            return false;
        }

        // Save if debounce has passed
        if since_last_change_ms >= self.debounce_ms {
            return true;
        }

        // Force save if max delay exceeded
        since_first_unsaved_ms >= self.max_delay_ms
    }

    /// Delay before retrying after `failures` consecutive failed saves.
    ///
    /// Doubles per failure, capped at `retry_max_ms`.
    pub fn retry_delay(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(16);
        let ms = self
            .retry_base_ms
            .saturating_mul(1u64 << exponent)
            .min(self.retry_max_ms);
        Duration::from_millis(ms)
    }
}
