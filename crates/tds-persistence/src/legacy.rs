//! Import of the legacy flat `KEY=VALUE` configuration.
//!
//! Values are carried over verbatim: the old format never enforced the
//! identifier formats the connection cards check, so a malformed client id
//! is imported as-is and left for the user to correct.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tds_model::{
    ApplicationState, ConnectionField, GenerationUpdate, MAX_TICKET_NUMBER, MigrationMarker,
    Provider,
};

use crate::error::{PersistenceError, Result};

/// Sibling file holding the legacy ticket counter.
pub const LEGACY_COUNTER_FILENAME: &str = "ticket_counter.json";

/// Parsed legacy configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyConfig {
    pub values: BTreeMap<String, String>,
    /// `last_ticket_number` from the sibling counter file.
    pub last_ticket_number: Option<u64>,
}

/// What an import applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyImport {
    /// Known keys that were applied.
    pub applied: Vec<&'static str>,
    /// Keys present in the file but not recognised.
    pub ignored: Vec<String>,
    /// Known keys whose value could not be used.
    pub rejected: Vec<&'static str>,
}

#[derive(Deserialize)]
struct LegacyCounter {
    last_ticket_number: u64,
}

impl LegacyConfig {
    /// Read a legacy file and its sibling counter, if any.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| PersistenceError::Io {
            operation: "read",
            path: path.to_path_buf(),
            source: e,
        })?;
        let counter_path = counter_path(path);
        Ok(Self {
            values: parse_env(&text),
            last_ticket_number: read_counter(&counter_path),
        })
    }

    /// Apply known keys to `state` and set the migration marker.
    pub fn apply(&self, state: &mut ApplicationState, now: DateTime<Utc>) -> LegacyImport {
        let mut import = LegacyImport::default();

        for (key, value) in &self.values {
            let Some(target) = LegacyKey::from_key(key) else {
                import.ignored.push(key.clone());
                continue;
            };
            if value.is_empty() {
                continue;
            }
            let ok = match target {
                LegacyKey::Connection(name, provider, field) => {
                    state.connections.set_unchecked(provider, field, value);
                    import.applied.push(name);
                    continue;
                }
                LegacyKey::NumEmails => value
                    .parse::<u32>()
                    .ok()
                    .and_then(|n| state.generation.apply(GenerationUpdate::EmailCount(n)).ok())
                    .is_some(),
                LegacyKey::WaitTimeMs => value
                    .parse::<u64>()
                    .ok()
                    .and_then(|n| state.generation.apply(GenerationUpdate::WaitTimeMs(n)).ok())
                    .is_some(),
            };
            let name = target.name();
            if ok {
                import.applied.push(name);
            } else {
                tracing::warn!(key = name, value = %value, "ignoring out-of-range legacy value");
                import.rejected.push(name);
            }
        }

        if let Some(last) = self.last_ticket_number {
            if last < MAX_TICKET_NUMBER {
                let next = (last + 1).max(state.generation.next_ticket_number);
                state.generation.next_ticket_number = next;
                import.applied.push("last_ticket_number");
            } else {
                tracing::warn!(last, "ignoring out-of-range legacy ticket counter");
                import.rejected.push("last_ticket_number");
            }
        }

        state.migration = MigrationMarker {
            legacy_imported: true,
            imported_at: Some(now),
        };
        import
    }
}

#[derive(Debug, Clone, Copy)]
enum LegacyKey {
    Connection(&'static str, Provider, ConnectionField),
    NumEmails,
    WaitTimeMs,
}

impl LegacyKey {
    fn from_key(key: &str) -> Option<Self> {
        use ConnectionField as F;
        let key = match key {
            "CLIENT_ID" => Self::Connection("CLIENT_ID", Provider::Microsoft, F::ClientId),
            "TENANT_ID" => Self::Connection("TENANT_ID", Provider::Microsoft, F::TenantId),
            "SENDER_EMAIL" => Self::Connection("SENDER_EMAIL", Provider::Microsoft, F::SenderEmail),
            "RECIPIENT_EMAIL" => {
                Self::Connection("RECIPIENT_EMAIL", Provider::Microsoft, F::RecipientEmail)
            }
            "FRESHSERVICE_DOMAIN" => {
                Self::Connection("FRESHSERVICE_DOMAIN", Provider::Freshservice, F::Domain)
            }
            "CLAUDE_API_KEY" => Self::Connection("CLAUDE_API_KEY", Provider::Claude, F::ApiKey),
            "FRESHSERVICE_API_KEY" => {
                Self::Connection("FRESHSERVICE_API_KEY", Provider::Freshservice, F::ApiKey)
            }
            "NUM_EMAILS" => Self::NumEmails,
            "WAIT_TIME_MS" => Self::WaitTimeMs,
            _ => return None,
        };
        Some(key)
    }

    fn name(self) -> &'static str {
        match self {
            Self::Connection(name, ..) => name,
            Self::NumEmails => "NUM_EMAILS",
            Self::WaitTimeMs => "WAIT_TIME_MS",
        }
    }
}

/// Parse `KEY=VALUE` lines.
///
/// Blank lines and `#` comments are skipped, an `export ` prefix is
/// accepted, and matching single or double quotes around a value are
/// removed. Unquoted values lose any trailing ` #` comment. Later keys win.
pub fn parse_env(text: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        values.insert(key.to_string(), unquote(value.trim()).to_string());
    }
    values
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    match value.find(" #") {
        Some(pos) => value[..pos].trim_end(),
        None => value,
    }
}

fn counter_path(legacy: &Path) -> PathBuf {
    legacy
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(LEGACY_COUNTER_FILENAME)
}

fn read_counter(path: &Path) -> Option<u64> {
    let text = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<LegacyCounter>(&text) {
        Ok(counter) => Some(counter.last_ticket_number),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable legacy ticket counter");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comments_quotes_and_export() {
        let values = parse_env(
            "# Microsoft\nexport CLIENT_ID=\"abc 123\"\nTENANT_ID='t'\n\nNUM_EMAILS=12 # default\nnot a pair\n",
        );
        assert_eq!(values["CLIENT_ID"], "abc 123");
        assert_eq!(values["TENANT_ID"], "t");
        assert_eq!(values["NUM_EMAILS"], "12");
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn apply_imports_verbatim_and_masks_keys() {
        let config = LegacyConfig {
            values: parse_env(
                "CLIENT_ID=abc123\nCLAUDE_API_KEY=sk-ant-0123456789abcdef\nUNKNOWN=1\nWAIT_TIME_MS=99999\n",
            ),
            last_ticket_number: Some(41),
        };
        let mut state = ApplicationState::default();
        let import = config.apply(&mut state, Utc::now());

        assert_eq!(state.connections.microsoft.client_id, "abc123");
        assert_eq!(state.connections.claude.api_key_last_four, "cdef");
        assert!(state.connections.claude.is_configured);
        assert_eq!(state.generation.next_ticket_number, 42);
        assert_eq!(state.generation.wait_time_ms, 10);
        assert_eq!(import.ignored, vec!["UNKNOWN".to_string()]);
        assert_eq!(import.rejected, vec!["WAIT_TIME_MS"]);
        assert!(state.migration.legacy_imported);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn counter_never_moves_backwards() {
        let config = LegacyConfig {
            values: BTreeMap::new(),
            last_ticket_number: Some(3),
        };
        let mut state = ApplicationState::default();
        state.generation.next_ticket_number = 10;
        config.apply(&mut state, Utc::now());
        assert_eq!(state.generation.next_ticket_number, 10);
    }

    #[test]
    fn counter_at_the_cap_is_rejected() {
        let config = LegacyConfig {
            values: BTreeMap::new(),
            last_ticket_number: Some(u64::MAX),
        };
        let mut state = ApplicationState::default();
        let import = config.apply(&mut state, Utc::now());
        assert_eq!(import.rejected, vec!["last_ticket_number"]);
        assert_eq!(state.generation.next_ticket_number, 1);
        assert!(state.validate().is_ok());
    }
}
