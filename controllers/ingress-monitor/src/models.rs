//! Provider-agnostic monitor model.

use std::collections::BTreeMap;

/// A website monitor derived from an ingress.
///
/// Built fresh on every reconciliation. `id` is assigned by the provider and
/// stays empty until the monitor exists remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Monitor {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Annotations of the owning ingress, used for provider-specific overrides.
    pub annotations: BTreeMap<String, String>,
}
