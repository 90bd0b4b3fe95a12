//! Draft artifacts produced by generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{DraftStatus, Priority, TicketType};
use crate::error::{Result, ValidationError};
use crate::validate;

/// Ticket classification: type, priority and category path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub priority: Priority,
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub item: String,
}

impl Classification {
    /// Classification used for every item of a custom-prompt batch.
    pub fn custom() -> Self {
        Self {
            ticket_type: TicketType::Incident,
            priority: Priority::P3,
            category: "Custom".to_string(),
            subcategory: String::new(),
            item: String::new(),
        }
    }

    /// `category / subcategory / item`, skipping empty segments.
    pub fn path(&self) -> String {
        [&self.category, &self.subcategory, &self.item]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Generated content that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDraft {
    pub classification: Classification,
    /// Subject as returned by the provider, untagged.
    pub subject: String,
    /// Body as returned by the provider, untagged.
    pub body: String,
    pub recipient: String,
}

impl NewDraft {
    /// Check the fields that must hold before the draft enters the tree.
    pub fn validate(&self) -> Result<()> {
        if self.subject.trim().is_empty() {
            return Err(ValidationError::Required { field: "subject" });
        }
        if self.body.trim().is_empty() {
            return Err(ValidationError::Required { field: "body" });
        }
        if self.classification.category.trim().is_empty() {
            return Err(ValidationError::Required { field: "category" });
        }
        validate::required_email("recipient", &self.recipient)
    }

    /// Build the artifact for `id`, tagging subject and body with the ticket number.
    pub fn into_artifact(self, id: u64) -> DraftArtifact {
        DraftArtifact {
            id,
            subject: tag_subject(id, &self.subject),
            body: tag_body(id, &self.body),
            classification: self.classification,
            recipient: self.recipient,
            status: DraftStatus::Draft,
            error_message: None,
            sent_timestamp: None,
        }
    }
}

/// Prefix a subject so the ticket can be traced in the helpdesk.
pub fn tag_subject(id: u64, subject: &str) -> String {
    format!("[TEST-TKT-{id}] {}", subject.trim())
}

/// Prefix a body with its ticket number.
pub fn tag_body(id: u64, body: &str) -> String {
    format!("[Ticket #{id}]\n\n{}", body.trim())
}

/// Individual email draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftArtifact {
    pub id: u64,
    #[serde(flatten)]
    pub classification: Classification,
    pub subject: String,
    pub body: String,
    pub recipient: String,
    #[serde(default)]
    pub status: DraftStatus,
    /// Set iff `status` is `Error`.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Set iff `status` is `Sent`.
    #[serde(default)]
    pub sent_timestamp: Option<DateTime<Utc>>,
}

impl DraftArtifact {
    /// Transition to `status`.
    ///
    /// `Error` requires a detail message; `Sent` stamps `sent_timestamp`.
    /// Every other status clears both optional fields.
    pub fn set_status(
        &mut self,
        status: DraftStatus,
        detail: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        match status {
            DraftStatus::Error => {
                let message = detail
                    .filter(|d| !d.trim().is_empty())
                    .ok_or(ValidationError::Required {
                        field: "error_message",
                    })?;
                self.error_message = Some(message);
                self.sent_timestamp = None;
            }
            DraftStatus::Sent => {
                self.error_message = None;
                self.sent_timestamp = Some(now);
            }
            DraftStatus::Draft | DraftStatus::Ready => {
                self.error_message = None;
                self.sent_timestamp = None;
            }
        }
        self.status = status;
        Ok(())
    }

    /// Check the status/detail pairing.
    pub fn validate(&self) -> Result<()> {
        let has_error = self.error_message.is_some();
        let has_sent = self.sent_timestamp.is_some();
        let consistent = match self.status {
            DraftStatus::Error => has_error && !has_sent,
            DraftStatus::Sent => has_sent && !has_error,
            DraftStatus::Draft | DraftStatus::Ready => !has_error && !has_sent,
        };
        if consistent {
            Ok(())
        } else {
            Err(ValidationError::Invariant(format!(
                "draft {} has status {} with inconsistent error/sent fields",
                self.id, self.status
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewDraft {
        NewDraft {
            classification: Classification {
                ticket_type: TicketType::Incident,
                priority: Priority::P2,
                category: "Hardware".into(),
                subcategory: "Printer".into(),
                item: String::new(),
            },
            subject: "Printer not working".into(),
            body: "The warehouse printer is jammed again.".into(),
            recipient: "helpdesk@example.com".into(),
        }
    }

    #[test]
    fn tagging_uses_assigned_id() {
        let draft = sample().into_artifact(42);
        assert_eq!(draft.subject, "[TEST-TKT-42] Printer not working");
        assert!(draft.body.starts_with("[Ticket #42]\n\n"));
        assert_eq!(draft.status, DraftStatus::Draft);
    }

    #[test]
    fn error_requires_detail() {
        let mut draft = sample().into_artifact(1);
        let now = Utc::now();
        assert!(draft.set_status(DraftStatus::Error, None, now).is_err());
        assert_eq!(draft.status, DraftStatus::Draft);

        draft
            .set_status(DraftStatus::Error, Some("mailbox full".into()), now)
            .unwrap();
        assert_eq!(draft.error_message.as_deref(), Some("mailbox full"));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn sent_stamps_and_clears_error() {
        let mut draft = sample().into_artifact(1);
        let now = Utc::now();
        draft
            .set_status(DraftStatus::Error, Some("boom".into()), now)
            .unwrap();
        draft.set_status(DraftStatus::Sent, None, now).unwrap();
        assert_eq!(draft.error_message, None);
        assert_eq!(draft.sent_timestamp, Some(now));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn new_draft_requires_recipient() {
        let mut draft = sample();
        draft.recipient = String::new();
        assert_eq!(
            draft.validate(),
            Err(ValidationError::Required { field: "recipient" })
        );
    }

    #[test]
    fn classification_path_skips_empty() {
        assert_eq!(sample().classification.path(), "Hardware / Printer");
    }
}
