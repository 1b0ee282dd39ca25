pub mod config;
pub mod logging;

pub mod adapter;
pub mod error;
pub mod gate;
pub mod manager;
pub mod path;
pub mod retry;
pub mod transport;

pub use adapter::{ApiVersion, VersionAdapter};
pub use config::{ManagerConfig, RetryConfig};
pub use error::{ApiErrorKind, ConfigError, LinkError, PathError};
pub use manager::{DirectLinkManager, LinkRequest, LinkResult};
