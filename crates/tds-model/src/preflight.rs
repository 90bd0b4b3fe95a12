//! Pre-send checklist.
//!
//! Each check is recorded independently; `all_passed` is recomputed from the
//! five flags on every change and never set directly.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// One item of the pre-send checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreflightCheck {
    Auth,
    Freshservice,
    Drafts,
    DryRun,
    RateLimit,
}

impl PreflightCheck {
    pub const ALL: [Self; 5] = [
        Self::Auth,
        Self::Freshservice,
        Self::Drafts,
        Self::DryRun,
        Self::RateLimit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Auth => "Microsoft sign-in",
            Self::Freshservice => "Freshservice connection",
            Self::Drafts => "Drafts reviewed",
            Self::DryRun => "Dry run",
            Self::RateLimit => "Rate limit",
        }
    }
}

/// Checklist state persisted with the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreflightState {
    pub auth_checked: bool,
    pub fs_checked: bool,
    pub drafts_checked: bool,
    pub dry_run_checked: bool,
    pub rate_limit_checked: bool,
    pub all_passed: bool,
}

impl PreflightState {
    pub fn is_checked(&self, check: PreflightCheck) -> bool {
        match check {
            PreflightCheck::Auth => self.auth_checked,
            PreflightCheck::Freshservice => self.fs_checked,
            PreflightCheck::Drafts => self.drafts_checked,
            PreflightCheck::DryRun => self.dry_run_checked,
            PreflightCheck::RateLimit => self.rate_limit_checked,
        }
    }

    /// Record the outcome of one check.
    pub fn record(&mut self, check: PreflightCheck, passed: bool) {
        let flag = match check {
            PreflightCheck::Auth => &mut self.auth_checked,
            PreflightCheck::Freshservice => &mut self.fs_checked,
            PreflightCheck::Drafts => &mut self.drafts_checked,
            PreflightCheck::DryRun => &mut self.dry_run_checked,
            PreflightCheck::RateLimit => &mut self.rate_limit_checked,
        };
        *flag = passed;
        self.all_passed = self.computed_all_passed();
    }

    /// The draft list changed, so its review no longer holds.
    pub fn invalidate_drafts(&mut self) {
        self.record(PreflightCheck::Drafts, false);
    }

    pub fn validate(&self) -> Result<()> {
        if self.all_passed != self.computed_all_passed() {
            return Err(ValidationError::Invariant(
                "preflight all_passed disagrees with the individual checks".to_string(),
            ));
        }
        Ok(())
    }

    fn computed_all_passed(&self) -> bool {
        PreflightCheck::ALL.iter().all(|check| self.is_checked(*check))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_passed_follows_the_checks() {
        let mut preflight = PreflightState::default();
        for check in PreflightCheck::ALL {
            assert!(!preflight.all_passed);
            preflight.record(check, true);
        }
        assert!(preflight.all_passed);
        assert!(preflight.validate().is_ok());

        preflight.invalidate_drafts();
        assert!(!preflight.drafts_checked);
        assert!(!preflight.all_passed);
        assert!(preflight.validate().is_ok());
    }

    #[test]
    fn inconsistent_summary_is_invalid() {
        let preflight = PreflightState {
            all_passed: true,
            ..PreflightState::default()
        };
        assert!(preflight.validate().is_err());
    }
}
