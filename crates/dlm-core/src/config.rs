use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::adapter::ApiVersion;
use crate::error::ConfigError;
use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per path (including the first).
    pub max_attempts: u32,
    /// Delay in seconds after the first failed attempt; doubles per attempt.
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 30,
        }
    }
}

/// Construction parameters for a `DirectLinkManager`, also the schema of
/// `~/.config/dlm/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Port the daemon's REST API listens on (0 = not configured).
    pub port: u16,
    /// Local path where the filespace is mounted.
    pub mount_point: String,
    /// Daemon API version: 2 or 3.
    pub version: u32,
    /// Filespace name; required for v2 links.
    pub filespace: Option<String>,
    /// Host the daemon is reached on.
    pub host: String,
    /// Maximum concurrent resolutions.
    pub max_workers: usize,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub retry: RetryConfig,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            port: 0,
            mount_point: String::new(),
            version: 3,
            filespace: None,
            host: "localhost".to_string(),
            max_workers: 10,
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
            retry: RetryConfig::default(),
        }
    }
}

impl ManagerConfig {
    /// Config with the required fields set and defaults for the rest.
    pub fn new(port: u16, mount_point: impl Into<String>, version: u32) -> Self {
        Self {
            port,
            mount_point: mount_point.into(),
            version,
            ..Self::default()
        }
    }

    pub fn with_filespace(mut self, filespace: impl Into<String>) -> Self {
        self.filespace = Some(filespace.into());
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_retry(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.retry.max_attempts = max_attempts;
        self.retry.base_delay_secs = base_delay.as_secs_f64();
        self
    }

    /// Checks every field; the first problem found is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.mount_point.trim().is_empty() {
            return Err(ConfigError::EmptyMountPoint);
        }
        let version = self.api_version()?;
        if self.max_workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        let delay = self.retry.base_delay_secs;
        if Duration::try_from_secs_f64(delay).is_err() {
            return Err(ConfigError::InvalidDelay(delay));
        }
        if version == ApiVersion::V2
            && self.filespace.as_deref().map_or(true, |s| s.trim().is_empty())
        {
            return Err(ConfigError::MissingFilespace);
        }
        Ok(())
    }

    pub fn api_version(&self) -> Result<ApiVersion, ConfigError> {
        ApiVersion::try_from(self.version)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.retry)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dlm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ManagerConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ManagerConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ManagerConfig =
        toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}
