//! Monitor providers.
//!
//! A provider owns the remote monitors. The controller only talks to it
//! through [`MonitorProvider`], which is selected once at startup from
//! [`ProviderKind`].

pub mod error;
#[cfg(test)]
pub mod fake;
pub mod null;
pub mod site24x7;

pub use error::ProviderError;

use crate::config::ProviderConfig;
use crate::models::Monitor;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Remote monitor management.
///
/// Monitors are addressed by name. `get` and `delete` report
/// [`ProviderError::MonitorNotFound`] for unknown names and leave it to the
/// caller to decide whether that is an error.
#[async_trait::async_trait]
pub trait MonitorProvider: Send + Sync + fmt::Debug {
    async fn create(&self, monitor: &Monitor) -> Result<(), ProviderError>;

    async fn get(&self, name: &str) -> Result<Monitor, ProviderError>;

    async fn update(&self, monitor: &Monitor) -> Result<(), ProviderError>;

    async fn delete(&self, name: &str) -> Result<(), ProviderError>;

    /// CIDR blocks the provider runs its checks from.
    async fn get_ip_source_ranges(&self, monitor: &Monitor) -> Result<Vec<String>, ProviderError>;
}

/// Supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Site24x7,
    /// Makes no remote calls. For testing only.
    Null,
}

impl FromStr for ProviderKind {
    type Err = crate::config::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "site24x7" => Ok(Self::Site24x7),
            "null" => Ok(Self::Null),
            other => Err(crate::config::ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Site24x7 => f.write_str("site24x7"),
            Self::Null => f.write_str("null"),
        }
    }
}

/// Creates the provider selected by `kind`.
pub fn new_provider(kind: ProviderKind, config: &ProviderConfig) -> Result<Arc<dyn MonitorProvider>, ProviderError> {
    match kind {
        ProviderKind::Site24x7 => Ok(Arc::new(site24x7::Site24x7Provider::new(&config.site24x7)?)),
        ProviderKind::Null => Ok(Arc::new(null::NullProvider)),
    }
}
