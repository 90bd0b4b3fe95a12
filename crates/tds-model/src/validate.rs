//! Field-level format and range checks.
//!
//! Empty strings are accepted by the format checks: an unset identifier is a
//! valid state for a connection that has not been configured yet.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, ValidationError};

static GUID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("Invalid GUID regex")
});

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("Invalid email regex")
});

static FRESHSERVICE_DOMAIN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9-]+\.freshservice\.com$").expect("Invalid Freshservice domain regex")
});

/// Longest email address accepted (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: usize = 254;

/// Longest local part accepted.
pub const MAX_EMAIL_LOCAL_LEN: usize = 64;

/// Shortest API key accepted before it is masked.
pub const MIN_API_KEY_LEN: usize = 20;

/// Check a GUID such as an Azure client or tenant id.
pub fn guid(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() || GUID_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::format(
            field,
            "expected xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx",
        ))
    }
}

/// Check an email address.
pub fn email(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    required_email(field, value)
}

/// Check an email address that must be present.
pub fn required_email(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ValidationError::Required { field });
    }
    if value.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field,
            len: value.len(),
            max: MAX_EMAIL_LEN,
        });
    }
    if !EMAIL_REGEX.is_match(value) {
        return Err(ValidationError::format(field, "invalid email format"));
    }
    let local = value.rsplit_once('@').map_or("", |(local, _)| local);
    if local.len() > MAX_EMAIL_LOCAL_LEN {
        return Err(ValidationError::format(
            field,
            format!("local part too long (max {MAX_EMAIL_LOCAL_LEN} characters)"),
        ));
    }
    Ok(())
}

/// Check a Freshservice helpdesk domain (`yourcompany.freshservice.com`).
pub fn freshservice_domain(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() || FRESHSERVICE_DOMAIN_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::format(
            field,
            "must be in format: yourcompany.freshservice.com",
        ))
    }
}

/// Check a raw API key before it is reduced to its last four characters.
pub fn api_key(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ValidationError::Required { field });
    }
    if value.chars().count() < MIN_API_KEY_LEN {
        return Err(ValidationError::format(field, "API key appears too short"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ValidationError::format(
            field,
            "API key must not contain whitespace",
        ));
    }
    Ok(())
}

/// Check that an integer lies in `[min, max]`.
pub fn range(field: &'static str, value: i64, min: i64, max: i64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Check a text length in characters.
pub fn max_len(field: &'static str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        Err(ValidationError::TooLong { field, len, max })
    } else {
        Ok(())
    }
}

/// Keep only the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    let start = chars.len().saturating_sub(4);
    chars[start..].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guid_accepts_mixed_case_and_empty() {
        assert!(guid("client_id", "").is_ok());
        assert!(guid("client_id", "12345678-ABCD-ef01-2345-6789abcdef01").is_ok());
        assert!(guid("client_id", "abc123").is_err());
    }

    #[test]
    fn email_rules() {
        assert!(email("sender_email", "").is_ok());
        assert!(email("sender_email", "it.support@example.com.au").is_ok());
        assert!(email("sender_email", "no-at-sign").is_err());
        assert_eq!(
            required_email("recipient", ""),
            Err(ValidationError::Required { field: "recipient" })
        );
        let long_local = format!("{}@example.com", "a".repeat(65));
        assert!(email("sender_email", &long_local).is_err());
    }

    #[test]
    fn freshservice_domain_rules() {
        assert!(freshservice_domain("domain", "acme.freshservice.com").is_ok());
        assert!(freshservice_domain("domain", "acme.zendesk.com").is_err());
        assert!(freshservice_domain("domain", "ACME.freshservice.com").is_err());
    }

    #[test]
    fn api_key_rules() {
        assert!(api_key("api_key", "short").is_err());
        assert!(api_key("api_key", "sk-ant-REDACTED").is_ok());
        assert!(api_key("api_key", "sk-ant-0123456789 abcdefghij").is_err());
    }

    #[test]
    fn mask_keeps_last_four() {
        assert_eq!(mask_secret("sk-ant-abcdef1234"), "1234");
        assert_eq!(mask_secret("ab"), "ab");
    }

    #[test]
    fn range_bounds_are_inclusive() {
        assert!(range("wait_time_ms", 0, 0, 5000).is_ok());
        assert!(range("wait_time_ms", 5000, 0, 5000).is_ok());
        assert!(range("wait_time_ms", 5001, 0, 5000).is_err());
    }
}
