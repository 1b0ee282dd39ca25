use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::LinkError;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff with a cap.
///
/// The delay before attempt `n + 1` is `base_delay * 2^(n-1)`, capped at
/// `max_delay`: deterministic in `n` and never decreasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        let cap = Duration::from_secs(cfg.max_delay_secs);
        // Out-of-range delays saturate to the cap; `validate` reports them.
        let base_delay = Duration::try_from_secs_f64(cfg.base_delay_secs).unwrap_or(cap);
        let max_delay = cap.max(base_delay);
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(exp).min(self.max_delay)
    }

    /// True when `error` is retryable and attempts remain after `attempt`.
    pub fn should_retry(&self, attempt: u32, error: &LinkError) -> bool {
        attempt < self.max_attempts && error.is_retryable()
    }

    pub fn decide(&self, attempt: u32, error: &LinkError) -> RetryDecision {
        if self.should_retry(attempt, error) {
            RetryDecision::RetryAfter(self.delay_for(attempt))
        } else {
            RetryDecision::NoRetry
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiErrorKind, PathError};

    fn transient() -> LinkError {
        LinkError::transient("HTTP 503")
    }

    #[test]
    fn no_retry_for_permanent_errors() {
        let p = RetryPolicy::default();
        let not_found = LinkError::api(ApiErrorKind::NotFound, "HTTP 404");
        let malformed = LinkError::api(ApiErrorKind::Malformed, "no field");
        let path = LinkError::Path(PathError::Empty);
        for e in [not_found, malformed, path] {
            assert_eq!(p.decide(1, &e), RetryDecision::NoRetry);
        }
    }

    #[test]
    fn exponential_backoff_grows_and_is_capped() {
        let p = RetryPolicy {
            max_attempts: 40,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        };
        assert_eq!(p.delay_for(1), Duration::from_millis(500));
        assert_eq!(p.delay_for(2), Duration::from_secs(1));
        assert_eq!(p.delay_for(3), Duration::from_secs(2));
        assert_eq!(p.delay_for(10), Duration::from_secs(10));
        assert_eq!(p.delay_for(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn delay_is_monotonic_non_decreasing() {
        let p = RetryPolicy::default();
        let mut prev = Duration::ZERO;
        for attempt in 1..64 {
            let d = p.delay_for(attempt);
            assert!(d >= prev, "attempt {} delay {:?} < {:?}", attempt, d, prev);
            assert_eq!(d, p.delay_for(attempt));
            prev = d;
        }
    }

    #[test]
    fn respects_max_attempts() {
        let p = RetryPolicy {
            max_attempts: 3,
            ..RetryPolicy::default()
        };
        assert!(matches!(p.decide(1, &transient()), RetryDecision::RetryAfter(_)));
        assert!(matches!(p.decide(2, &transient()), RetryDecision::RetryAfter(_)));
        assert_eq!(p.decide(3, &transient()), RetryDecision::NoRetry);
    }

    #[test]
    fn from_config_clamps() {
        let cfg = RetryConfig {
            max_attempts: 0,
            base_delay_secs: 2.0,
            max_delay_secs: 1,
        };
        let p = RetryPolicy::from(&cfg);
        assert_eq!(p.max_attempts, 1);
        assert_eq!(p.base_delay, Duration::from_secs(2));
        assert_eq!(p.max_delay, Duration::from_secs(2));
    }

    #[test]
    fn unrepresentable_base_delay_saturates_to_cap() {
        let cfg = RetryConfig {
            max_attempts: 3,
            base_delay_secs: 1e20,
            max_delay_secs: 30,
        };
        let p = RetryPolicy::from(&cfg);
        assert_eq!(p.base_delay, Duration::from_secs(30));
        assert_eq!(p.delay_for(1), Duration::from_secs(30));
    }
}
