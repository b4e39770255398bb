//! Reconciliation of ingresses to their monitors.
//!
//! Every change to an ingress, including its removal, ends up in
//! [`IngressReconciler::reconcile`], which re-reads the ingress from the
//! cluster and decides what to do based on its current state.

use crate::annotations;
use crate::backoff::BackoffStates;
use crate::error::ControllerError;
use crate::monitor::MonitorService;
use chrono::{DateTime, Utc};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use kube::api::PostParams;
use kube::{Api, Client};
use kube_runtime::controller::Action;
use std::time::Duration;
use tracing::{debug, info};

/// What to do with the monitor of an ingress.
#[derive(Debug, PartialEq)]
pub enum ReconcileAction<'a> {
    /// The ingress is gone or no longer monitored.
    DeleteMonitor,
    /// The creation delay has not passed yet.
    RequeueAfter(Duration),
    /// Patch the whitelist if needed, then create or update the monitor.
    EnsureMonitor(&'a Ingress),
}

/// Decides how to reconcile an ingress given its current state.
///
/// Monitoring is only enabled by the literal annotation value `true`.
pub fn plan_reconcile(ingress: Option<&Ingress>, now: DateTime<Utc>, creation_delay: Duration) -> ReconcileAction<'_> {
    let Some(ingress) = ingress else {
        return ReconcileAction::DeleteMonitor;
    };

    let enabled = ingress
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(annotations::ENABLED))
        .is_some_and(|value| value == "true");

    if !enabled {
        return ReconcileAction::DeleteMonitor;
    }

    if let Some(remaining) = remaining_delay(ingress, now, creation_delay) {
        return ReconcileAction::RequeueAfter(remaining);
    }

    ReconcileAction::EnsureMonitor(ingress)
}

/// Time left until the creation delay of the ingress has passed, if any.
fn remaining_delay(ingress: &Ingress, now: DateTime<Utc>, creation_delay: Duration) -> Option<Duration> {
    let delay = chrono::Duration::from_std(creation_delay).ok()?;
    let Time(created) = ingress.metadata.creation_timestamp.as_ref()?;
    let create_at = created.checked_add_signed(delay)?;

    (create_at - now).to_std().ok().filter(|remaining| !remaining.is_zero())
}

/// Stand-in for an ingress that no longer exists. Enough to derive the
/// monitor name.
fn metadata_only(name: &str, namespace: &str) -> Ingress {
    Ingress {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Reconciles ingresses against the monitor provider.
pub struct IngressReconciler {
    client: Client,
    service: MonitorService,
    creation_delay: Duration,
    backoff_states: BackoffStates,
}

impl IngressReconciler {
    pub fn new(client: Client, service: MonitorService, creation_delay: Duration) -> Self {
        Self {
            client,
            service,
            creation_delay,
            backoff_states: BackoffStates::default(),
        }
    }

    /// Creates, updates or deletes the monitor of the named ingress.
    pub async fn reconcile(&self, name: &str, namespace: &str) -> Result<Action, ControllerError> {
        let api: Api<Ingress> = Api::namespaced(self.client.clone(), namespace);
        let ingress = api.get_opt(name).await?;

        match plan_reconcile(ingress.as_ref(), Utc::now(), self.creation_delay) {
            ReconcileAction::DeleteMonitor => {
                let fallback = metadata_only(name, namespace);
                self.service
                    .delete_monitor(ingress.as_ref().unwrap_or(&fallback))
                    .await?;
            }
            ReconcileAction::RequeueAfter(delay) => {
                debug!(
                    "Ingress {}/{} is younger than the creation delay, requeueing in {:?}",
                    namespace, name, delay
                );
                return Ok(Action::requeue(delay));
            }
            ReconcileAction::EnsureMonitor(ingress) => {
                self.create_or_update(&api, ingress).await?;
            }
        }

        Ok(Action::await_change())
    }

    /// Updating the ingress triggers another reconciliation, so the monitor
    /// is only ensured once the whitelist is up to date.
    async fn create_or_update(&self, api: &Api<Ingress>, ingress: &Ingress) -> Result<(), ControllerError> {
        let mut patched = ingress.clone();

        if self.service.annotate_ingress(&mut patched).await? {
            let name = patched.metadata.name.clone().unwrap_or_default();
            api.replace(&name, &PostParams::default(), &patched).await?;
            info!(
                "Updated whitelist annotation of ingress {}/{}",
                patched.metadata.namespace.as_deref().unwrap_or_default(),
                name
            );
            return Ok(());
        }

        self.service.ensure_monitor(ingress).await?;
        Ok(())
    }

    /// Reconciles an ingress after it was deleted, retrying with backoff
    /// until the reconciliation succeeds. Deleted ingresses never reach the
    /// controller queue again, so this is their only retry path.
    pub async fn reconcile_deletion(&self, name: &str, namespace: &str) {
        let key = resource_key(namespace, name);

        let failures = self
            .backoff_states
            .retry(&key, || async move { self.reconcile(name, namespace).await.map(drop) })
            .await;

        if failures > 0 {
            info!("Reconciled deleted ingress {} after {} failed attempts", key, failures);
        }
    }

    /// Next requeue delay for a failing ingress.
    pub fn backoff_for(&self, key: &str) -> Duration {
        self.backoff_states.next_backoff(key)
    }

    /// Resets the backoff of an ingress after a successful reconciliation.
    pub fn reset_backoff(&self, key: &str) {
        self.backoff_states.reset(key);
    }
}

/// Key used for per-ingress state.
pub fn resource_key(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingress::tests::new_ingress;
    use crate::metrics::Metrics;
    use crate::models::Monitor;
    use crate::namer::{Namer, DEFAULT_NAME_TEMPLATE};
    use crate::provider::fake::FakeProvider;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn created_at(ingress: &mut Ingress, timestamp: &str) {
        ingress.metadata.creation_timestamp = Some(Time(at(timestamp)));
    }

    fn at(timestamp: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(timestamp).unwrap().with_timezone(&Utc)
    }

    fn enabled_ingress() -> Ingress {
        let mut ingress = new_ingress(
            "kube-system",
            "foo",
            &[(annotations::ENABLED, "true")],
            &["foo.bar.baz"],
            &[],
        );
        created_at(&mut ingress, "2024-01-01T00:00:00Z");
        ingress
    }

    #[test]
    fn test_missing_ingress_deletes_monitor() {
        let action = plan_reconcile(None, at("2024-01-01T00:00:00Z"), Duration::ZERO);

        assert_eq!(action, ReconcileAction::DeleteMonitor);
    }

    #[test]
    fn test_enabled_ingress_ensures_monitor() {
        let ingress = enabled_ingress();

        let action = plan_reconcile(Some(&ingress), at("2024-01-01T00:00:00Z"), Duration::ZERO);

        assert_eq!(action, ReconcileAction::EnsureMonitor(&ingress));
    }

    #[test]
    fn test_disabled_ingress_deletes_monitor() {
        for value in [None, Some("false"), Some("True"), Some("1")] {
            let annotations: Vec<(&str, &str)> = value.map(|v| (annotations::ENABLED, v)).into_iter().collect();
            let ingress = new_ingress("default", "foo", &annotations, &["foo.bar.baz"], &[]);

            let action = plan_reconcile(Some(&ingress), at("2024-01-01T00:00:00Z"), Duration::ZERO);

            assert_eq!(action, ReconcileAction::DeleteMonitor, "enabled = {:?}", value);
        }
    }

    #[test]
    fn test_creation_delay_requeues_young_ingress() {
        let ingress = enabled_ingress();

        let action = plan_reconcile(
            Some(&ingress),
            at("2024-01-01T00:00:20Z"),
            Duration::from_secs(60),
        );

        assert_eq!(action, ReconcileAction::RequeueAfter(Duration::from_secs(40)));
    }

    #[test]
    fn test_creation_delay_passed() {
        let ingress = enabled_ingress();

        let action = plan_reconcile(
            Some(&ingress),
            at("2024-01-01T00:01:00Z"),
            Duration::from_secs(60),
        );

        assert_eq!(action, ReconcileAction::EnsureMonitor(&ingress));
    }

    #[test]
    fn test_creation_delay_does_not_apply_to_disabled_ingress() {
        let mut ingress = new_ingress("default", "foo", &[], &["foo.bar.baz"], &[]);
        created_at(&mut ingress, "2024-01-01T00:00:00Z");

        let action = plan_reconcile(
            Some(&ingress),
            at("2024-01-01T00:00:01Z"),
            Duration::from_secs(60),
        );

        assert_eq!(action, ReconcileAction::DeleteMonitor);
    }

    #[test]
    fn test_metadata_only_ingress() {
        let ingress = metadata_only("foo", "kube-system");

        assert_eq!(ingress.metadata.name.as_deref(), Some("foo"));
        assert_eq!(ingress.metadata.namespace.as_deref(), Some("kube-system"));
        assert!(ingress.spec.is_none());
    }

    fn not_found_client(requests: Arc<AtomicUsize>) -> Client {
        let service = tower::service_fn(move |_request: http::Request<kube::client::Body>| {
            requests.fetch_add(1, Ordering::SeqCst);
            let status = json!({
                "kind": "Status",
                "apiVersion": "v1",
                "metadata": {},
                "status": "Failure",
                "message": "ingresses.networking.k8s.io \"foo\" not found",
                "reason": "NotFound",
                "details": {"name": "foo", "group": "networking.k8s.io", "kind": "ingresses"},
                "code": 404
            });

            async move {
                http::Response::builder()
                    .status(404)
                    .header("content-type", "application/json")
                    .body(kube::client::Body::from(serde_json::to_vec(&status).unwrap()))
            }
        });

        Client::new(service, "default")
    }

    #[tokio::test(start_paused = true)]
    async fn test_deletion_is_retried_until_monitor_is_removed() {
        let namer = Namer::new(DEFAULT_NAME_TEMPLATE).unwrap();
        let name = namer.name(&metadata_only("foo", "kube-system")).unwrap();
        let provider = Arc::new(FakeProvider::with_monitor(Monitor {
            name: name.clone(),
            ..Default::default()
        }));
        provider.delete_failures.store(2, Ordering::SeqCst);

        let metrics = Arc::new(Metrics::new().unwrap());
        let service = MonitorService::new(provider.clone(), namer, false, metrics);
        let requests = Arc::new(AtomicUsize::new(0));
        let reconciler = IngressReconciler::new(not_found_client(requests.clone()), service, Duration::ZERO);
        let started = tokio::time::Instant::now();

        reconciler.reconcile_deletion("foo", "kube-system").await;

        assert_eq!(provider.deleted(), vec![name]);
        assert_eq!(requests.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_secs(2 * 60));
        assert_eq!(reconciler.backoff_for(&resource_key("kube-system", "foo")), Duration::from_secs(60));
    }

    #[test]
    fn test_resource_key() {
        assert_eq!(resource_key("kube-system", "foo"), "kube-system/foo");
    }
}
