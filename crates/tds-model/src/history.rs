//! Send batch history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::validate;

/// Maximum number of history records kept.
pub const MAX_HISTORY: usize = 100;

/// Historical send batch record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendBatchRecord {
    pub batch_id: String,
    pub timestamp: DateTime<Utc>,
    pub emails_sent: u32,
    pub emails_succeeded: u32,
    pub emails_failed: u32,
    pub recipient: String,
}

impl SendBatchRecord {
    /// Check counts and recipient.
    pub fn validate(&self) -> Result<()> {
        if self.batch_id.trim().is_empty() {
            return Err(ValidationError::Required { field: "batch_id" });
        }
        validate::required_email("recipient", &self.recipient)?;
        if self.emails_succeeded + self.emails_failed > self.emails_sent {
            return Err(ValidationError::Invariant(format!(
                "batch {}: succeeded + failed exceeds sent",
                self.batch_id
            )));
        }
        Ok(())
    }
}

/// Append a record, dropping the oldest entries beyond [`MAX_HISTORY`].
pub fn push_capped(history: &mut Vec<SendBatchRecord>, record: SendBatchRecord) {
    history.push(record);
    if history.len() > MAX_HISTORY {
        let excess = history.len() - MAX_HISTORY;
        history.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: u32) -> SendBatchRecord {
        SendBatchRecord {
            batch_id: format!("batch-{n}"),
            timestamp: Utc::now(),
            emails_sent: 3,
            emails_succeeded: 2,
            emails_failed: 1,
            recipient: "helpdesk@example.com".into(),
        }
    }

    #[test]
    fn keeps_newest_hundred() {
        let mut history = Vec::new();
        for n in 0..105 {
            push_capped(&mut history, record(n));
        }
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history[0].batch_id, "batch-5");
        assert_eq!(history[99].batch_id, "batch-104");
    }

    #[test]
    fn counts_must_add_up() {
        let mut bad = record(1);
        bad.emails_failed = 2;
        assert!(bad.validate().is_err());
        assert!(record(1).validate().is_ok());
    }
}
