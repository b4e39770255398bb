//! Monitor synchronization for ingresses.
//!
//! [`MonitorService`] is the single entry point of the reconciler. It
//! validates ingresses, derives their monitors and forwards the decisions to
//! the configured provider.

mod annotate;
mod service;

pub use service::MonitorService;
