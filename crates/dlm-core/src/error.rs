//! Error taxonomy for direct link resolution.
//!
//! Lifecycle errors (`Config`, `Connection`) abort a whole call; everything
//! else is scoped to a single path and lands in that path's `LinkResult`
//! during batch resolution.

use std::fmt;
use thiserror::Error;

/// Invalid construction parameters or use of a closed manager.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("port must be greater than 0")]
    InvalidPort,
    #[error("mount point must not be empty")]
    EmptyMountPoint,
    #[error("unsupported API version {0} (expected 2 or 3)")]
    UnsupportedVersion(u32),
    #[error("max_workers must be at least 1")]
    ZeroWorkers,
    #[error("retry max_attempts must be at least 1")]
    ZeroAttempts,
    #[error("retry base delay must be a non-negative number of seconds that fits a duration (got {0})")]
    InvalidDelay(f64),
    #[error("API v2 links require a filespace name")]
    MissingFilespace,
    #[error("entry id links are only available with API v2")]
    EntryIdUnsupported,
    #[error("manager is closed")]
    Closed,
}

/// A path that cannot be mapped into the filespace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,
    #[error("{path} is not under mount point {mount_point}")]
    OutsideMount { path: String, mount_point: String },
    #[error("{0} escapes the mount point via '..'")]
    EscapesMount(String),
    #[error("{0} contains a NUL byte")]
    NulByte(String),
}

/// Classification of a failed exchange with the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The daemon does not know the path (4xx). Not retried.
    NotFound,
    /// 2xx response without the expected link field. Not retried.
    Malformed,
    /// 5xx, unparseable body or transport failure. Retried.
    Transient,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApiErrorKind::NotFound => "not_found",
            ApiErrorKind::Malformed => "malformed",
            ApiErrorKind::Transient => "transient",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("path error: {0}")]
    Path(#[from] PathError),
    #[error("cannot reach daemon: {0}")]
    Connection(String),
    #[error("daemon API error ({kind}): {message}")]
    Api { kind: ApiErrorKind, message: String },
    #[error("gave up after {attempts} attempts: {last}")]
    ExhaustedRetries { attempts: u32, last: Box<LinkError> },
    #[error("resolution task failed: {0}")]
    TaskFailed(String),
}

impl LinkError {
    pub fn api(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        LinkError::Api {
            kind,
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::api(ApiErrorKind::Transient, message)
    }

    /// The API error kind, looking through `ExhaustedRetries`.
    pub fn api_kind(&self) -> Option<ApiErrorKind> {
        match self {
            LinkError::Api { kind, .. } => Some(*kind),
            LinkError::ExhaustedRetries { last, .. } => last.api_kind(),
            _ => None,
        }
    }

    /// Only transient daemon failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LinkError::Api {
                kind: ApiErrorKind::Transient,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_is_retryable() {
        assert!(LinkError::transient("HTTP 503").is_retryable());
        assert!(!LinkError::api(ApiErrorKind::NotFound, "gone").is_retryable());
        assert!(!LinkError::api(ApiErrorKind::Malformed, "no field").is_retryable());
        assert!(!LinkError::Path(PathError::Empty).is_retryable());
        assert!(!LinkError::Config(ConfigError::Closed).is_retryable());
        assert!(!LinkError::Connection("refused".into()).is_retryable());
    }

    #[test]
    fn exhausted_exposes_last_kind() {
        let e = LinkError::ExhaustedRetries {
            attempts: 3,
            last: Box::new(LinkError::transient("HTTP 500")),
        };
        assert_eq!(e.api_kind(), Some(ApiErrorKind::Transient));
        assert!(!e.is_retryable());
        assert_eq!(
            e.to_string(),
            "gave up after 3 attempts: daemon API error (transient): HTTP 500"
        );
    }
}
