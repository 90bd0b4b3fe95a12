//! Fixed retry policy for provider calls.

use std::time::Duration;

use crate::error::ProviderError;

/// How provider failures are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per item, including the first.
    pub max_attempts: u32,
    /// Rate-limit backoff, multiplied by the attempt number.
    pub rate_limit_backoff: Duration,
    /// Ceiling on any rate-limit wait, including provider `retry-after` hints.
    pub max_rate_limit_backoff: Duration,
    /// Backoff after timeouts and network errors.
    pub transient_backoff: Duration,
    /// Backoff after other retryable errors.
    pub error_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_backoff: Duration::from_secs(2),
            max_rate_limit_backoff: Duration::from_secs(60),
            transient_backoff: Duration::from_secs(2),
            error_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Same attempt bound, no waiting.
    pub fn immediate() -> Self {
        Self {
            rate_limit_backoff: Duration::ZERO,
            max_rate_limit_backoff: Duration::ZERO,
            transient_backoff: Duration::ZERO,
            error_backoff: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Delay before the next attempt after `attempt` (1-based) failed with
    /// `error`, or `None` if the item should fail now.
    pub fn delay_after(&self, attempt: u32, error: &ProviderError) -> Option<Duration> {
        if !error.is_retryable() || attempt >= self.max_attempts {
            return None;
        }
        let delay = match error {
            ProviderError::RateLimited { retry_after } => {
                let backoff = self.rate_limit_backoff.saturating_mul(attempt);
                let suggested = retry_after.map_or(Duration::ZERO, Duration::from_secs);
                if self.rate_limit_backoff.is_zero() {
                    Duration::ZERO
                } else {
                    backoff.max(suggested).min(self.max_rate_limit_backoff)
                }
            }
            ProviderError::Timeout | ProviderError::Network(_) => self.transient_backoff,
            _ => self.error_backoff,
        };
        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_backs_off_longer_each_attempt() {
        let policy = RetryPolicy::default();
        let limited = ProviderError::RateLimited { retry_after: None };
        assert_eq!(policy.delay_after(1, &limited), Some(Duration::from_secs(2)));
        assert_eq!(policy.delay_after(2, &limited), Some(Duration::from_secs(4)));
        assert_eq!(policy.delay_after(3, &limited), None);
    }

    #[test]
    fn provider_hint_extends_backoff() {
        let policy = RetryPolicy::default();
        let limited = ProviderError::RateLimited {
            retry_after: Some(10),
        };
        assert_eq!(policy.delay_after(1, &limited), Some(Duration::from_secs(10)));
    }

    #[test]
    fn provider_hint_is_capped() {
        let policy = RetryPolicy::default();
        let limited = ProviderError::RateLimited {
            retry_after: Some(86_400),
        };
        assert_eq!(policy.delay_after(1, &limited), Some(Duration::from_secs(60)));

        let policy = RetryPolicy {
            max_attempts: 10,
            ..RetryPolicy::default()
        };
        let limited = ProviderError::RateLimited { retry_after: None };
        assert_eq!(policy.delay_after(9, &limited), Some(Duration::from_secs(18)));
    }

    #[test]
    fn non_retryable_fails_immediately() {
        let policy = RetryPolicy::default();
        let rejected = ProviderError::from_status(400, "bad request");
        assert_eq!(policy.delay_after(1, &rejected), None);
    }

    #[test]
    fn immediate_policy_keeps_bound() {
        let policy = RetryPolicy::immediate();
        assert_eq!(
            policy.delay_after(1, &ProviderError::Timeout),
            Some(Duration::ZERO)
        );
        assert_eq!(policy.delay_after(3, &ProviderError::Timeout), None);
    }
}
