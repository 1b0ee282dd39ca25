//! Retry loop: run an attempt until success or the policy says stop.

use std::future::Future;

use super::policy::{RetryDecision, RetryPolicy};
use crate::error::LinkError;

/// Runs `attempt_fn` (given the 1-based attempt number) until it succeeds or
/// the policy stops retrying. A transient error that survives every attempt
/// is surfaced as `ExhaustedRetries`; permanent errors are returned as-is.
pub async fn run_with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    label: &str,
    mut attempt_fn: F,
) -> Result<T, LinkError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, LinkError>>,
{
    let mut attempt = 1u32;
    loop {
        tracing::debug!("{}: attempt {}/{}", label, attempt, policy.max_attempts);
        let err = match attempt_fn(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };
        match policy.decide(attempt, &err) {
            RetryDecision::RetryAfter(delay) => {
                tracing::warn!(
                    "{}: attempt {} failed ({}); retrying in {:?}",
                    label,
                    attempt,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            RetryDecision::NoRetry if err.is_retryable() => {
                return Err(LinkError::ExhaustedRetries {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }
            RetryDecision::NoRetry => return Err(err),
        }
    }
}
