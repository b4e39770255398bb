//! Prometheus metrics and the metrics/health HTTP endpoint.

use crate::error::ControllerError;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Counters recorded by the monitor service.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    validation_errors: IntCounterVec,
    monitors_created: IntCounterVec,
    monitors_updated: IntCounterVec,
    monitors_deleted: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let validation_errors = IntCounterVec::new(
            Opts::new(
                "ingress_monitor_validation_errors_total",
                "Total number of ingresses skipped because they failed validation",
            ),
            &["namespace", "name"],
        )?;
        let monitors_created = IntCounterVec::new(
            Opts::new("ingress_monitor_monitors_created_total", "Total number of created monitors"),
            &["monitor"],
        )?;
        let monitors_updated = IntCounterVec::new(
            Opts::new("ingress_monitor_monitors_updated_total", "Total number of updated monitors"),
            &["monitor"],
        )?;
        let monitors_deleted = IntCounterVec::new(
            Opts::new("ingress_monitor_monitors_deleted_total", "Total number of deleted monitors"),
            &["monitor"],
        )?;

        registry.register(Box::new(validation_errors.clone()))?;
        registry.register(Box::new(monitors_created.clone()))?;
        registry.register(Box::new(monitors_updated.clone()))?;
        registry.register(Box::new(monitors_deleted.clone()))?;

        Ok(Self {
            registry,
            validation_errors,
            monitors_created,
            monitors_updated,
            monitors_deleted,
        })
    }

    pub fn record_validation_error(&self, namespace: &str, name: &str) {
        self.validation_errors.with_label_values(&[namespace, name]).inc();
    }

    pub fn record_created(&self, monitor: &str) {
        self.monitors_created.with_label_values(&[monitor]).inc();
    }

    pub fn record_updated(&self, monitor: &str) {
        self.monitors_updated.with_label_values(&[monitor]).inc();
    }

    pub fn record_deleted(&self, monitor: &str) {
        self.monitors_deleted.with_label_values(&[monitor]).inc();
    }

    /// Renders all metrics in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;

        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    #[cfg(test)]
    pub fn created_count(&self, monitor: &str) -> u64 {
        self.monitors_created.with_label_values(&[monitor]).get()
    }

    #[cfg(test)]
    pub fn updated_count(&self, monitor: &str) -> u64 {
        self.monitors_updated.with_label_values(&[monitor]).get()
    }

    #[cfg(test)]
    pub fn deleted_count(&self, monitor: &str) -> u64 {
        self.monitors_deleted.with_label_values(&[monitor]).get()
    }

    #[cfg(test)]
    pub fn validation_error_count(&self, namespace: &str, name: &str) -> u64 {
        self.validation_errors.with_label_values(&[namespace, name]).get()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

/// Router serving `GET /metrics` and `GET /healthz`.
pub fn metrics_routes(metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<Arc<Metrics>>) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Serves the metrics router until the listener fails.
pub async fn serve(addr: SocketAddr, metrics: Arc<Metrics>) -> Result<(), ControllerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ControllerError::Metrics(format!("failed to bind {}: {}", addr, e)))?;

    info!("Serving metrics on {}", addr);

    axum::serve(listener, metrics_routes(metrics))
        .await
        .map_err(|e| ControllerError::Metrics(e.to_string()))
}
