//! Provider errors.

use super::site24x7::builder::BuildError;
use site24x7_client::Site24x7Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// No monitor with the requested name exists
    #[error("monitor not found")]
    MonitorNotFound,

    #[error("failed to initialize site24x7 client: {0}")]
    Init(#[source] Site24x7Error),

    #[error("failed to build site24x7 monitor {name}: {source}")]
    Build {
        name: String,
        #[source]
        source: BuildError,
    },

    #[error("failed to list site24x7 monitors: {0}")]
    List(#[source] Site24x7Error),

    #[error("failed to create site24x7 monitor {name}: {source}")]
    Create {
        name: String,
        #[source]
        source: Site24x7Error,
    },

    #[error("failed to update site24x7 monitor {name}: {source}")]
    Update {
        name: String,
        #[source]
        source: Site24x7Error,
    },

    #[error("failed to delete site24x7 monitor with ID {id}: {source}")]
    Delete {
        id: String,
        #[source]
        source: Site24x7Error,
    },

    #[error("failed to resolve IPs of location profile {profile_id}: {source}")]
    SourceRanges {
        profile_id: String,
        #[source]
        source: Site24x7Error,
    },
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::MonitorNotFound)
    }
}
