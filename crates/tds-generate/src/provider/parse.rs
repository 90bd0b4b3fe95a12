//! Turning model text into a subject and body.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::ProviderError;

static FENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[a-zA-Z]*\s*(.*?)\s*```").expect("Invalid fence regex")
});

static OBJECT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)\{[^{}]*"subject"[^{}]*\}"#).expect("Invalid object regex")
});

static SUBJECT_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*subject\s*:\s*(.+)$").expect("Invalid subject regex")
});

static DESCRIPTION_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(?:description|body)\s*:\s*(.+)").expect("Invalid description regex")
});

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    subject: String,
    #[serde(default, alias = "body")]
    description: String,
}

impl Content {
    fn into_pair(self) -> Option<(String, String)> {
        let subject = self.subject.trim();
        let description = self.description.trim();
        (!subject.is_empty() && !description.is_empty())
            .then(|| (subject.to_string(), description.to_string()))
    }
}

/// Extract `(subject, body)` from model output.
///
/// Accepts a bare JSON object, one wrapped in a markdown fence or
/// surrounded by chatter, and finally `subject:` / `description:` lines.
pub fn parse_content(text: &str) -> Result<(String, String), ProviderError> {
    let text = text.trim();
    let unfenced = FENCE_REGEX
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str());

    if let Some(pair) = serde_json::from_str::<Content>(unfenced)
        .ok()
        .and_then(Content::into_pair)
    {
        return Ok(pair);
    }

    if let Some(pair) = OBJECT_REGEX
        .find(unfenced)
        .and_then(|m| serde_json::from_str::<Content>(m.as_str()).ok())
        .and_then(Content::into_pair)
    {
        return Ok(pair);
    }

    let subject = SUBJECT_LINE_REGEX
        .captures(unfenced)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().trim_matches('"').to_string());
    let description = DESCRIPTION_LINE_REGEX
        .captures(unfenced)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().trim_matches('"').to_string());
    if let (Some(subject), Some(description)) = (subject, description)
        && !subject.is_empty()
        && !description.is_empty()
    {
        return Ok((subject, description));
    }

    let preview: String = text.chars().take(200).collect();
    Err(ProviderError::InvalidResponse(format!(
        "no subject/description found in: {preview}"
    )))
}
