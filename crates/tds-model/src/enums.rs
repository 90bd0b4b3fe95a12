//! Enumerated values used across the state tree.

use serde::{Deserialize, Serialize};

/// Theme mode (auto follows the OS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Light,
    Dark,
}

/// Writing quality requested from the content provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    /// Casual texting style, frequent typos.
    Basic,
    /// Everyday user writing with minor imperfections.
    #[default]
    Realistic,
    /// Professional, well-structured writing.
    Polished,
}

impl QualityLevel {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Realistic => "Realistic",
            Self::Polished => "Polished",
        }
    }

    /// All available levels.
    pub const ALL: [QualityLevel; 3] = [Self::Basic, Self::Realistic, Self::Polished];
}

/// How ticket classifications are chosen for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Categories, priorities and types drawn from the catalog.
    #[default]
    Guided,
    /// Every item driven by the user's custom prompt.
    Custom,
}

/// Lifecycle status of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    #[default]
    Draft,
    Ready,
    Sent,
    Error,
}

impl DraftStatus {
    /// Get display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Ready => "Ready",
            Self::Sent => "Sent",
            Self::Error => "Error",
        }
    }
}

impl std::fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Ticket type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TicketType {
    #[default]
    Incident,
    #[serde(rename = "Service Request")]
    ServiceRequest,
}

impl TicketType {
    /// Get display label (also the wire name).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Incident => "Incident",
            Self::ServiceRequest => "Service Request",
        }
    }

    /// All ticket types.
    pub const ALL: [TicketType; 2] = [Self::Incident, Self::ServiceRequest];
}

impl std::fmt::Display for TicketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Ticket priority, 1 (urgent) to 4 (low).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "Priority 1")]
    P1,
    #[serde(rename = "Priority 2")]
    P2,
    #[serde(rename = "Priority 3")]
    P3,
    #[serde(rename = "Priority 4")]
    P4,
}

impl Priority {
    /// Get display label (also the wire name).
    pub fn label(&self) -> &'static str {
        match self {
            Self::P1 => "Priority 1",
            Self::P2 => "Priority 2",
            Self::P3 => "Priority 3",
            Self::P4 => "Priority 4",
        }
    }

    /// Short severity word used in prompts.
    pub fn severity(&self) -> &'static str {
        match self {
            Self::P1 => "URGENT",
            Self::P2 => "HIGH",
            Self::P3 => "MEDIUM",
            Self::P4 => "LOW",
        }
    }

    /// All priorities, most urgent first.
    pub const ALL: [Priority; 4] = [Self::P1, Self::P2, Self::P3, Self::P4];
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_labels() {
        for priority in Priority::ALL {
            let json = serde_json::to_string(&priority).unwrap();
            assert_eq!(json, format!("\"{}\"", priority.label()));
        }
        for ticket_type in TicketType::ALL {
            let json = serde_json::to_string(&ticket_type).unwrap();
            assert_eq!(json, format!("\"{}\"", ticket_type.label()));
        }
    }

    #[test]
    fn lowercase_enums() {
        assert_eq!(serde_json::to_string(&DraftStatus::Sent).unwrap(), "\"sent\"");
        assert_eq!(
            serde_json::to_string(&QualityLevel::Polished).unwrap(),
            "\"polished\""
        );
        assert_eq!(serde_json::to_string(&ThemeMode::Auto).unwrap(), "\"auto\"");
    }
}
