//! Kubernetes ingress watchers.
//!
//! Applied ingresses are reconciled through a `kube_runtime::Controller`,
//! which requeues failures with a per-ingress Fibonacci backoff. The
//! controller does not reconcile deleted objects, so a plain watcher forwards
//! `Delete` events to the same reconciler.

use crate::error::ControllerError;
use crate::reconciler::{resource_key, IngressReconciler};
use futures::StreamExt;
use k8s_openapi::api::networking::v1::Ingress;
use kube::Api;
use kube_runtime::controller::{Action, Config as ControllerConfig};
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Events for the same ingress arriving within this window are reconciled once.
const DEBOUNCE: Duration = Duration::from_secs(1);
const CONCURRENCY: u16 = 4;
const WATCH_RETRY_DELAY: Duration = Duration::from_secs(5);

fn ingress_ref(ingress: &Ingress) -> (&str, &str) {
    (
        ingress.metadata.namespace.as_deref().unwrap_or("default"),
        ingress.metadata.name.as_deref().unwrap_or_default(),
    )
}

async fn reconcile(ingress: Arc<Ingress>, reconciler: Arc<IngressReconciler>) -> Result<Action, ControllerError> {
    let (namespace, name) = ingress_ref(&ingress);
    debug!("Reconciling ingress {}/{}", namespace, name);

    let action = reconciler.reconcile(name, namespace).await?;
    reconciler.reset_backoff(&resource_key(namespace, name));

    Ok(action)
}

fn error_policy(ingress: Arc<Ingress>, error: &ControllerError, reconciler: Arc<IngressReconciler>) -> Action {
    let (namespace, name) = ingress_ref(&ingress);
    let delay = reconciler.backoff_for(&resource_key(namespace, name));

    error!(
        "Reconciliation of ingress {}/{} failed: {}, retrying in {:?}",
        namespace, name, error, delay
    );

    Action::requeue(delay)
}

/// Watches ingresses and drives their reconciliation.
pub struct Watcher {
    reconciler: Arc<IngressReconciler>,
    api: Api<Ingress>,
}

impl Watcher {
    pub fn new(reconciler: Arc<IngressReconciler>, api: Api<Ingress>) -> Self {
        Self { reconciler, api }
    }

    /// Reconciles applied ingresses until the controller stream ends.
    pub async fn watch_ingresses(&self) -> Result<(), ControllerError> {
        info!("Starting ingress watcher");

        let config = ControllerConfig::default().debounce(DEBOUNCE).concurrency(CONCURRENCY);

        Controller::new(self.api.clone(), watcher::Config::default())
            .with_config(config)
            .shutdown_on_signal()
            .run(reconcile, error_policy, self.reconciler.clone())
            .for_each(|res| async move {
                match res {
                    Ok((obj, _)) => debug!("Reconciled ingress {}", obj),
                    Err(e) => debug!("Ingress controller error: {}", e),
                }
            })
            .await;

        info!("Ingress watcher stopped");
        Ok(())
    }

    /// Removes the monitors of deleted ingresses. Each deletion runs in its
    /// own task so a failing provider does not hold up the watch.
    pub async fn watch_deletions(&self) -> Result<(), ControllerError> {
        info!("Starting ingress deletion watcher");

        let mut stream = watcher(self.api.clone(), watcher::Config::default()).boxed();

        while let Some(event) = stream.next().await {
            match event {
                Ok(watcher::Event::Delete(ingress)) => {
                    let (namespace, name) = ingress_ref(&ingress);
                    info!("Ingress {}/{} deleted", namespace, name);

                    let reconciler = self.reconciler.clone();
                    let (namespace, name) = (namespace.to_string(), name.to_string());
                    tokio::spawn(async move { reconciler.reconcile_deletion(&name, &namespace).await });
                }
                Ok(watcher::Event::InitDone) => debug!("Ingress deletion watcher initialized"),
                Ok(_) => {}
                Err(e) => {
                    warn!("Ingress deletion watch failed, retrying: {}", e);
                    tokio::time::sleep(WATCH_RETRY_DELAY).await;
                }
            }
        }

        Err(ControllerError::Watch("ingress deletion watch ended".to_string()))
    }
}
