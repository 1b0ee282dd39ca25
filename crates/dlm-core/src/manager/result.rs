//! Per-path request and outcome types.

use crate::error::LinkError;

/// One path submitted for resolution, exactly as the caller gave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRequest {
    pub raw_path: String,
}

impl LinkRequest {
    pub fn new(raw_path: impl Into<String>) -> Self {
        Self {
            raw_path: raw_path.into(),
        }
    }
}

/// Outcome for one `LinkRequest` of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkResult {
    pub request: LinkRequest,
    pub outcome: Result<String, LinkError>,
}

impl LinkResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn link(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }

    pub fn error(&self) -> Option<&LinkError> {
        self.outcome.as_ref().err()
    }
}
