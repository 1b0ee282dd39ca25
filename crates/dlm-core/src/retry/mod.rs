//! Retry and backoff policy.
//!
//! Decides, per failed attempt, whether a resolution is tried again and how
//! long to wait first. Only transient daemon failures are retried; when the
//! attempt budget runs out the last error is wrapped in `ExhaustedRetries`.

mod policy;
mod run;

pub use policy::{RetryDecision, RetryPolicy};
pub use run::run_with_retry;
