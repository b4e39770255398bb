//! Controller-specific error types.
//!
//! Errors of the individual building blocks live next to them (annotations,
//! ingress validation, naming, providers). This module holds the errors that
//! the monitor service and the controller surface to the reconcile loop.

use crate::config::ConfigError;
use crate::ingress::UrlError;
use crate::namer::NamerError;
use crate::provider::ProviderError;
use kube::Error as KubeError;
use thiserror::Error;

/// Errors returned by the monitor service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Monitor URL could not be derived from the ingress
    #[error(transparent)]
    Url(#[from] UrlError),

    /// Monitor name could not be rendered
    #[error(transparent)]
    Namer(#[from] NamerError),

    /// Monitor provider failed
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Errors that can occur in the ingress monitor controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Monitor service error
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Monitor provider could not be set up
    #[error("Failed to initialize monitor provider: {0}")]
    Provider(#[from] ProviderError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Metrics endpoint failed
    #[error("Metrics server failed: {0}")]
    Metrics(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}
