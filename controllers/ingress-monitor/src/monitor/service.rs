//! Create, update and delete decisions for ingress monitors.

use crate::error::ServiceError;
use crate::ingress::{self, ValidationError};
use crate::metrics::Metrics;
use crate::models::Monitor;
use crate::namer::Namer;
use crate::provider::MonitorProvider;
use k8s_openapi::api::networking::v1::Ingress;
use std::sync::Arc;
use tracing::{debug, info};

/// Keeps the provider-side monitor of an ingress in sync.
///
/// Ingresses that fail validation are skipped: they are recorded in the
/// validation error counter but never reported as errors. Provider errors
/// are returned unchanged so the caller can retry.
#[derive(Debug, Clone)]
pub struct MonitorService {
    provider: Arc<dyn MonitorProvider>,
    namer: Namer,
    no_delete: bool,
    metrics: Arc<Metrics>,
}

impl MonitorService {
    pub fn new(provider: Arc<dyn MonitorProvider>, namer: Namer, no_delete: bool, metrics: Arc<Metrics>) -> Self {
        Self {
            provider,
            namer,
            no_delete,
            metrics,
        }
    }

    /// Creates the monitor of the ingress, or updates it if it already exists.
    pub async fn ensure_monitor(&self, ingress: &Ingress) -> Result<(), ServiceError> {
        if let Err(e) = ingress::validate(ingress) {
            self.skip_invalid(ingress, &e);
            return Ok(());
        }

        let mut monitor = self.build_monitor(ingress)?;

        match self.provider.get(&monitor.name).await {
            Ok(existing) => {
                monitor.id = existing.id;
                self.provider.update(&monitor).await?;
                self.metrics.record_updated(&monitor.name);
                info!("Updated monitor {} for {}", monitor.name, monitor.url);
            }
            Err(e) if e.is_not_found() => {
                self.provider.create(&monitor).await?;
                self.metrics.record_created(&monitor.name);
                info!("Created monitor {} for {}", monitor.name, monitor.url);
            }
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }

    /// Deletes the monitor of the ingress. A monitor that does not exist is
    /// not an error.
    ///
    /// Only the ingress metadata is needed, so this also works for ingresses
    /// that have already been removed from the cluster.
    pub async fn delete_monitor(&self, ingress: &Ingress) -> Result<(), ServiceError> {
        let name = self.namer.name(ingress)?;

        if self.no_delete {
            debug!("Not deleting monitor {}, deletion is disabled", name);
            return Ok(());
        }

        match self.provider.delete(&name).await {
            Ok(()) => {
                self.metrics.record_deleted(&name);
                info!("Deleted monitor {}", name);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!("Monitor {} does not exist, nothing to delete", name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// CIDR blocks the provider checks the ingress from. Empty for ingresses
    /// that fail validation.
    pub async fn get_provider_ip_source_ranges(&self, ingress: &Ingress) -> Result<Vec<String>, ServiceError> {
        if let Err(e) = ingress::validate(ingress) {
            self.skip_invalid(ingress, &e);
            return Ok(Vec::new());
        }

        let monitor = self.build_monitor(ingress)?;

        Ok(self.provider.get_ip_source_ranges(&monitor).await?)
    }

    fn build_monitor(&self, ingress: &Ingress) -> Result<Monitor, ServiceError> {
        Ok(Monitor {
            id: String::new(),
            name: self.namer.name(ingress)?,
            url: ingress::build_monitor_url(ingress)?,
            annotations: ingress::ingress_annotations(ingress).clone(),
        })
    }

    fn skip_invalid(&self, ingress: &Ingress, error: &ValidationError) {
        let namespace = ingress.metadata.namespace.as_deref().unwrap_or_default();
        let name = ingress.metadata.name.as_deref().unwrap_or_default();

        self.metrics.record_validation_error(namespace, name);
        debug!("Ignoring ingress {}/{}: {}", namespace, name, error);
    }
}
