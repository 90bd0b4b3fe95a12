//! Connection settings for the three external providers.
//!
//! Secrets are never stored in the tree. API keys pass validation in full and
//! are then reduced to their last four characters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::validate;

/// External provider addressed by a connection update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Microsoft 365 mail sending.
    Microsoft,
    /// Claude content generation.
    Claude,
    /// Freshservice ticket verification.
    Freshservice,
}

impl Provider {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Microsoft => "Microsoft 365",
            Self::Claude => "Claude",
            Self::Freshservice => "Freshservice",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Editable connection field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionField {
    ClientId,
    TenantId,
    SenderEmail,
    RecipientEmail,
    /// Raw API key; persisted masked.
    ApiKey,
    Domain,
}

impl ConnectionField {
    /// Schema name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ClientId => "client_id",
            Self::TenantId => "tenant_id",
            Self::SenderEmail => "sender_email",
            Self::RecipientEmail => "recipient_email",
            Self::ApiKey => "api_key",
            Self::Domain => "domain",
        }
    }
}

/// Microsoft 365 connection state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicrosoftConnection {
    /// Azure app registration (client) id.
    pub client_id: String,
    /// Azure tenant id.
    pub tenant_id: String,
    /// Mailbox the drafts are sent from.
    pub sender_email: String,
    /// Helpdesk mailbox the drafts are sent to.
    pub recipient_email: String,
    /// Expiry of the cached access token, if any.
    pub token_expiry: Option<DateTime<Utc>>,
    /// Whether sign-in succeeded.
    pub is_authenticated: bool,
    /// When authentication was last checked.
    pub last_checked: Option<DateTime<Utc>>,
}

/// Claude API connection state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaudeConnection {
    pub api_key_last_four: String,
    pub is_configured: bool,
    pub last_checked: Option<DateTime<Utc>>,
}

/// Freshservice connection state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshserviceConnection {
    /// Helpdesk domain, e.g. `acme.freshservice.com`.
    pub domain: String,
    pub api_key_last_four: String,
    pub is_connected: bool,
    pub last_checked: Option<DateTime<Utc>>,
}

/// All connection states.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionsState {
    pub microsoft: MicrosoftConnection,
    pub claude: ClaudeConnection,
    pub freshservice: FreshserviceConnection,
}

impl ConnectionsState {
    /// Check a proposed value without applying it.
    pub fn validate_field(provider: Provider, field: ConnectionField, value: &str) -> Result<()> {
        use ConnectionField as F;
        let name = field.name();
        match (provider, field) {
            (Provider::Microsoft, F::ClientId | F::TenantId) => validate::guid(name, value),
            (Provider::Microsoft, F::SenderEmail | F::RecipientEmail) => {
                validate::email(name, value)
            }
            (Provider::Claude | Provider::Freshservice, F::ApiKey) => {
                validate::api_key(name, value)
            }
            (Provider::Freshservice, F::Domain) => validate::freshservice_domain(name, value),
            _ => Err(ValidationError::UnknownField {
                provider: provider.label(),
                field: name,
            }),
        }
    }

    /// Validate then apply a field update. Nothing is written on error.
    pub fn apply(&mut self, provider: Provider, field: ConnectionField, value: &str) -> Result<()> {
        Self::validate_field(provider, field, value)?;
        self.set_unchecked(provider, field, value);
        Ok(())
    }

    /// Write a field without format validation.
    ///
    /// Used by legacy import, where values are carried over verbatim and
    /// re-validated by the user on the connection cards.
    pub fn set_unchecked(&mut self, provider: Provider, field: ConnectionField, value: &str) {
        use ConnectionField as F;
        let value = value.trim();
        match (provider, field) {
            (Provider::Microsoft, F::ClientId) => self.microsoft.client_id = value.to_string(),
            (Provider::Microsoft, F::TenantId) => self.microsoft.tenant_id = value.to_string(),
            (Provider::Microsoft, F::SenderEmail) => {
                self.microsoft.sender_email = value.to_string();
            }
            (Provider::Microsoft, F::RecipientEmail) => {
                self.microsoft.recipient_email = value.to_string();
            }
            (Provider::Claude, F::ApiKey) => {
                self.claude.api_key_last_four = validate::mask_secret(value);
                self.claude.is_configured = !value.is_empty();
            }
            (Provider::Freshservice, F::ApiKey) => {
                self.freshservice.api_key_last_four = validate::mask_secret(value);
            }
            (Provider::Freshservice, F::Domain) => self.freshservice.domain = value.to_string(),
            _ => {}
        }
    }

    /// Record the outcome of a connection check.
    pub fn set_status(&mut self, provider: Provider, validated: bool, checked_at: DateTime<Utc>) {
        match provider {
            Provider::Microsoft => {
                self.microsoft.is_authenticated = validated;
                self.microsoft.last_checked = Some(checked_at);
            }
            Provider::Claude => {
                self.claude.is_configured = validated;
                self.claude.last_checked = Some(checked_at);
            }
            Provider::Freshservice => {
                self.freshservice.is_connected = validated;
                self.freshservice.last_checked = Some(checked_at);
            }
        }
    }

    /// Whether the provider's connected/validated flag is set.
    pub fn is_validated(&self, provider: Provider) -> bool {
        match provider {
            Provider::Microsoft => self.microsoft.is_authenticated,
            Provider::Claude => self.claude.is_configured,
            Provider::Freshservice => self.freshservice.is_connected,
        }
    }

    /// Validate masked secrets of a loaded subtree.
    ///
    /// Identifier formats are not enforced here: legacy imports may carry
    /// values that only the user can correct.
    pub fn validate(&self) -> Result<()> {
        for (field, masked) in [
            ("claude.api_key_last_four", &self.claude.api_key_last_four),
            (
                "freshservice.api_key_last_four",
                &self.freshservice.api_key_last_four,
            ),
        ] {
            validate::max_len(field, masked, 4)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_leaves_state_untouched() {
        let mut connections = ConnectionsState::default();
        let err = connections
            .apply(Provider::Microsoft, ConnectionField::ClientId, "abc123")
            .unwrap_err();
        assert_eq!(err.field(), Some("client_id"));
        assert_eq!(connections, ConnectionsState::default());
    }

    #[test]
    fn field_must_belong_to_provider() {
        let mut connections = ConnectionsState::default();
        let err = connections
            .apply(Provider::Claude, ConnectionField::Domain, "acme.freshservice.com")
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnknownField { .. }));
    }

    #[test]
    fn api_key_is_masked() {
        let mut connections = ConnectionsState::default();
        connections
            .apply(
                Provider::Claude,
                ConnectionField::ApiKey,
                "sk-ant-REDACTED",
            )
            .unwrap();
        assert_eq!(connections.claude.api_key_last_four, "WXYZ");
        assert!(connections.claude.is_configured);
    }

    #[test]
    fn status_stamps_last_checked() {
        let mut connections = ConnectionsState::default();
        let now = Utc::now();
        connections.set_status(Provider::Freshservice, true, now);
        assert!(connections.is_validated(Provider::Freshservice));
        assert_eq!(connections.freshservice.last_checked, Some(now));
    }
}
