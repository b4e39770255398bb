//! Ingress Monitor Controller
//!
//! Keeps website monitors in sync with Kubernetes ingresses annotated with
//! `ingress-monitor.bonial.com/enabled: "true"`. Monitors are created and
//! updated when the ingress changes and removed when the ingress is deleted
//! or monitoring is disabled.

mod annotations;
mod backoff;
mod cache;
mod config;
mod controller;
mod error;
mod ingress;
mod metrics;
mod models;
mod monitor;
mod namer;
mod provider;
mod reconciler;
mod watcher;

use crate::config::{ConfigError, Options, ProviderConfig};
use crate::error::ControllerError;
use crate::metrics::Metrics;
use crate::monitor::MonitorService;
use crate::namer::Namer;
use controller::Controller;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    // kube and reqwest both use rustls
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Failed to install rustls crypto provider: {:?}", e);
        std::process::exit(1);
    }

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Ingress Monitor Controller");

    let options = Options::from_env()?;
    let provider_config = ProviderConfig::load(options.provider_config_file.as_deref(), |name| {
        std::env::var(name).ok()
    })?;
    options.validate(&provider_config)?;

    info!("Configuration:");
    info!("  Provider: {}", options.provider);
    info!("  Name template: {}", options.name_template);
    info!("  No delete: {}", options.no_delete);
    info!("  Creation delay: {:?}", options.creation_delay);
    info!("  Namespace: {}", options.watch_namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Metrics address: {}", options.metrics_addr);

    let namer = Namer::new(&options.name_template).map_err(|e| ConfigError::Invalid(e.to_string()))?;
    let provider = provider::new_provider(options.provider, &provider_config)?;
    let metrics = Arc::new(Metrics::new().map_err(|e| ControllerError::Metrics(e.to_string()))?);

    let service = MonitorService::new(provider, namer, options.no_delete, metrics.clone());

    let controller = Controller::new(&options, service, metrics).await?;
    controller.run().await?;

    Ok(())
}
