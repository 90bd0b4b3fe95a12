//! Generation settings and their constraints.

use serde::{Deserialize, Serialize};

use crate::enums::{GenerationMode, QualityLevel};
use crate::error::{Result, ValidationError};
use crate::validate;

/// Smallest batch that can be requested.
pub const MIN_EMAIL_COUNT: u32 = 1;
/// Largest batch that can be requested.
pub const MAX_EMAIL_COUNT: u32 = 1000;
/// Longest inter-call wait in milliseconds.
pub const MAX_WAIT_TIME_MS: u64 = 5000;
/// Longest custom prompt in characters.
pub const MAX_CUSTOM_PROMPT_LEN: usize = 5000;
/// Highest value the ticket counter may hold.
pub const MAX_TICKET_NUMBER: u64 = i64::MAX as u64;

/// Email generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Number of drafts requested per batch.
    pub email_count: u32,
    /// Writing quality.
    pub quality: QualityLevel,
    /// Wait between provider calls in milliseconds.
    pub wait_time_ms: u64,
    /// Guided (catalog-driven) or custom prompt.
    pub mode: GenerationMode,
    /// Prompt used in custom mode.
    pub custom_prompt: String,
    /// Id handed to the next appended draft.
    ///
    /// Only the store advances this; it is never edited directly.
    pub next_ticket_number: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            email_count: 5,
            quality: QualityLevel::default(),
            wait_time_ms: 10,
            mode: GenerationMode::default(),
            custom_prompt: String::new(),
            next_ticket_number: 1,
        }
    }
}

/// A single edit to the generation settings.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationUpdate {
    EmailCount(u32),
    Quality(QualityLevel),
    WaitTimeMs(u64),
    Mode(GenerationMode),
    CustomPrompt(String),
}

impl GenerationSettings {
    /// Validate then apply an update. Nothing is written on error.
    pub fn apply(&mut self, update: GenerationUpdate) -> Result<()> {
        match update {
            GenerationUpdate::EmailCount(count) => {
                validate_email_count(count)?;
                self.email_count = count;
            }
            GenerationUpdate::Quality(quality) => self.quality = quality,
            GenerationUpdate::WaitTimeMs(wait) => {
                validate_wait_time(wait)?;
                self.wait_time_ms = wait;
            }
            GenerationUpdate::Mode(mode) => self.mode = mode,
            GenerationUpdate::CustomPrompt(prompt) => {
                validate::max_len("custom_prompt", &prompt, MAX_CUSTOM_PROMPT_LEN)?;
                self.custom_prompt = prompt;
            }
        }
        Ok(())
    }

    /// Whether custom mode is active and has a usable prompt.
    pub fn uses_custom_prompt(&self) -> bool {
        self.mode == GenerationMode::Custom && !self.custom_prompt.trim().is_empty()
    }

    /// Validate every field (used on load).
    pub fn validate(&self) -> Result<()> {
        validate_email_count(self.email_count)?;
        validate_wait_time(self.wait_time_ms)?;
        validate::max_len("custom_prompt", &self.custom_prompt, MAX_CUSTOM_PROMPT_LEN)?;
        validate_ticket_counter(self.next_ticket_number)
    }
}

/// Check a requested batch size.
pub fn validate_email_count(count: u32) -> Result<()> {
    validate::range(
        "email_count",
        i64::from(count),
        i64::from(MIN_EMAIL_COUNT),
        i64::from(MAX_EMAIL_COUNT),
    )
}

fn validate_ticket_counter(next: u64) -> Result<()> {
    let value = i64::try_from(next).map_err(|_| ValidationError::OutOfRange {
        field: "next_ticket_number",
        value: i64::MAX,
        min: 1,
        max: MAX_TICKET_NUMBER as i64,
    })?;
    validate::range("next_ticket_number", value, 1, MAX_TICKET_NUMBER as i64)
}

fn validate_wait_time(wait: u64) -> Result<()> {
    let value = i64::try_from(wait).unwrap_or(i64::MAX);
    validate::range("wait_time_ms", value, 0, MAX_WAIT_TIME_MS as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GenerationSettings::default().validate().is_ok());
    }

    #[test]
    fn rejected_update_keeps_previous_value() {
        let mut settings = GenerationSettings::default();
        assert!(settings.apply(GenerationUpdate::EmailCount(0)).is_err());
        assert!(settings.apply(GenerationUpdate::EmailCount(1001)).is_err());
        assert!(settings.apply(GenerationUpdate::WaitTimeMs(6000)).is_err());
        assert_eq!(settings, GenerationSettings::default());

        settings.apply(GenerationUpdate::EmailCount(1000)).unwrap();
        assert_eq!(settings.email_count, 1000);
    }

    #[test]
    fn ticket_counter_is_bounded() {
        let mut settings = GenerationSettings::default();
        settings.next_ticket_number = MAX_TICKET_NUMBER;
        assert!(settings.validate().is_ok());
        settings.next_ticket_number = u64::MAX;
        assert!(matches!(
            settings.validate(),
            Err(ValidationError::OutOfRange { field: "next_ticket_number", .. })
        ));
        settings.next_ticket_number = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn custom_prompt_needs_custom_mode() {
        let mut settings = GenerationSettings::default();
        settings
            .apply(GenerationUpdate::CustomPrompt("Printer jams".into()))
            .unwrap();
        assert!(!settings.uses_custom_prompt());
        settings
            .apply(GenerationUpdate::Mode(GenerationMode::Custom))
            .unwrap();
        assert!(settings.uses_custom_prompt());
    }

    #[test]
    fn custom_prompt_length_limit() {
        let mut settings = GenerationSettings::default();
        let prompt = "x".repeat(MAX_CUSTOM_PROMPT_LEN + 1);
        let err = settings
            .apply(GenerationUpdate::CustomPrompt(prompt))
            .unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { .. }));
    }
}
