//! Per-version request building and response parsing.
//!
//! The daemon exposes two incompatible schemas. The adapter is chosen once
//! when the manager opens and is the only component aware of the difference.

mod classify;
mod v2;
mod v3;

pub use classify::classify_status;
pub use v2::V2Schema;
pub use v3::V3Schema;

use std::fmt;

use crate::error::{ConfigError, LinkError};
use crate::transport::DaemonRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V2,
    V3,
}

impl TryFrom<u32> for ApiVersion {
    type Error = ConfigError;

    fn try_from(v: u32) -> Result<Self, Self::Error> {
        match v {
            2 => Ok(ApiVersion::V2),
            3 => Ok(ApiVersion::V3),
            other => Err(ConfigError::UnsupportedVersion(other)),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::V2 => f.write_str("v2"),
            ApiVersion::V3 => f.write_str("v3"),
        }
    }
}

/// Schema strategy for one daemon API version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionAdapter {
    V2(V2Schema),
    V3(V3Schema),
}

impl VersionAdapter {
    /// v2 links embed the filespace name, so v2 requires one.
    pub fn new(version: ApiVersion, filespace: Option<&str>) -> Result<Self, ConfigError> {
        match version {
            ApiVersion::V2 => {
                let filespace = filespace
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or(ConfigError::MissingFilespace)?;
                Ok(VersionAdapter::V2(V2Schema::new(filespace)))
            }
            ApiVersion::V3 => Ok(VersionAdapter::V3(V3Schema)),
        }
    }

    pub fn version(&self) -> ApiVersion {
        match self {
            VersionAdapter::V2(_) => ApiVersion::V2,
            VersionAdapter::V3(_) => ApiVersion::V3,
        }
    }

    pub fn build_request(&self, encoded_path: &str) -> DaemonRequest {
        let path_and_query = match self {
            VersionAdapter::V2(s) => s.path_and_query(encoded_path),
            VersionAdapter::V3(s) => s.path_and_query(encoded_path),
        };
        DaemonRequest { path_and_query }
    }

    /// Maps a daemon response onto a direct link or a classified error.
    pub fn parse_response(&self, status: u32, body: &[u8]) -> Result<String, LinkError> {
        if let Some(err) = classify_status(status, body) {
            return Err(err);
        }
        let json: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| LinkError::transient(format!("invalid JSON from daemon: {}", e)))?;
        match self {
            VersionAdapter::V2(s) => s.link_from_json(&json),
            VersionAdapter::V3(s) => s.link_from_json(&json),
        }
    }

    /// Builds a link from an already-known entry id without asking the daemon.
    /// Only v2 links are derived from entry ids.
    pub fn link_for_entry(&self, entry_id: &str) -> Result<String, ConfigError> {
        match self {
            VersionAdapter::V2(s) => Ok(s.link_for_entry(entry_id)),
            VersionAdapter::V3(_) => Err(ConfigError::EntryIdUnsupported),
        }
    }
}
