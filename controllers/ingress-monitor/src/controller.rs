//! Main controller implementation.
//!
//! Wires the monitor service, the ingress watchers and the metrics endpoint
//! together and runs them until one of them stops.

use crate::config::Options;
use crate::error::ControllerError;
use crate::metrics::{self, Metrics};
use crate::monitor::MonitorService;
use crate::reconciler::IngressReconciler;
use crate::watcher::Watcher;
use k8s_openapi::api::networking::v1::Ingress;
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Ingress monitor controller.
pub struct Controller {
    ingress_watcher: JoinHandle<Result<(), ControllerError>>,
    deletion_watcher: JoinHandle<Result<(), ControllerError>>,
    metrics_server: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Connects to the cluster and starts all background tasks.
    pub async fn new(options: &Options, service: MonitorService, metrics: Arc<Metrics>) -> Result<Self, ControllerError> {
        info!("Initializing Ingress Monitor Controller");

        let client = Client::try_default().await?;

        let api: Api<Ingress> = match options.watch_namespace.as_deref() {
            Some(namespace) => Api::namespaced(client.clone(), namespace),
            None => Api::all(client.clone()),
        };

        let reconciler = Arc::new(IngressReconciler::new(client, service, options.creation_delay));
        let watcher = Arc::new(Watcher::new(reconciler, api));

        let ingress_watcher = {
            let watcher = watcher.clone();
            tokio::spawn(async move { watcher.watch_ingresses().await })
        };
        let deletion_watcher = tokio::spawn(async move { watcher.watch_deletions().await });

        let addr = options.metrics_addr;
        let metrics_server = tokio::spawn(async move { metrics::serve(addr, metrics).await });

        Ok(Self {
            ingress_watcher,
            deletion_watcher,
            metrics_server,
        })
    }

    /// Runs the controller until a watcher or the metrics server exits.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("Ingress Monitor Controller running");

        tokio::select! {
            result = &mut self.ingress_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("ingress watcher panicked: {}", e)))??;
            }
            result = &mut self.deletion_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("ingress deletion watcher panicked: {}", e)))??;
            }
            result = &mut self.metrics_server => {
                result.map_err(|e| ControllerError::Metrics(format!("metrics server panicked: {}", e)))??;
            }
        }

        info!("Ingress Monitor Controller stopped");
        Ok(())
    }
}
