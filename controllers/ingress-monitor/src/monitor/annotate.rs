//! Admits provider check IPs into an ingress source range whitelist.

use super::MonitorService;
use crate::annotations::{self, Annotations};
use crate::error::ServiceError;
use crate::ingress::ingress_annotations;
use k8s_openapi::api::networking::v1::Ingress;
use tracing::{debug, info};

impl MonitorService {
    /// Appends the provider IP source ranges missing from the whitelist
    /// annotation of a monitored ingress.
    ///
    /// Only an existing, non-empty whitelist is extended. Returns whether the
    /// ingress was modified and needs to be persisted.
    pub async fn annotate_ingress(&self, ingress: &mut Ingress) -> Result<bool, ServiceError> {
        let anno = Annotations::new(ingress_annotations(ingress));

        if !anno.is_true(annotations::ENABLED) {
            return Ok(false);
        }

        let current = match anno.get(annotations::NGINX_WHITELIST_SOURCE_RANGE) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => return Ok(false),
        };

        let provider_ranges = self.get_provider_ip_source_ranges(ingress).await?;
        if provider_ranges.is_empty() {
            return Ok(false);
        }

        let Some(merged) = merge_source_ranges(&current, &provider_ranges) else {
            debug!(
                "Whitelist of ingress {}/{} already contains all provider source ranges",
                ingress.metadata.namespace.as_deref().unwrap_or_default(),
                ingress.metadata.name.as_deref().unwrap_or_default(),
            );
            return Ok(false);
        };

        info!(
            "Adding provider source ranges to whitelist of ingress {}/{}: {}",
            ingress.metadata.namespace.as_deref().unwrap_or_default(),
            ingress.metadata.name.as_deref().unwrap_or_default(),
            merged
        );

        ingress
            .metadata
            .annotations
            .get_or_insert_with(Default::default)
            .insert(annotations::NGINX_WHITELIST_SOURCE_RANGE.to_string(), merged);

        Ok(true)
    }
}

/// Appends the ranges of `provider` that are not yet part of the comma
/// separated `current` whitelist, in provider order.
///
/// Entries are compared verbatim. Returns `None` if nothing is missing.
fn merge_source_ranges(current: &str, provider: &[String]) -> Option<String> {
    let existing: Vec<&str> = current.split(',').collect();

    let missing: Vec<&str> = provider
        .iter()
        .map(String::as_str)
        .filter(|range| !existing.contains(range))
        .collect();

    if missing.is_empty() {
        return None;
    }

    Some(existing.into_iter().chain(missing).collect::<Vec<_>>().join(","))
}
