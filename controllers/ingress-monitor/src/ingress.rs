//! Ingress validation and monitor URL derivation.
//!
//! Only the first TLS host and the first rule host of an ingress are
//! consulted: every ingress maps to exactly one monitored hostname.

use crate::annotations::{self, Annotations};
use k8s_openapi::api::networking::v1::Ingress;
use reqwest::Url;
use std::collections::BTreeMap;
use thiserror::Error;

static NO_ANNOTATIONS: BTreeMap<String, String> = BTreeMap::new();

/// Reasons an ingress does not qualify for monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("ingress TLS host {0:?} contains wildcards")]
    InvalidWildcardTlsHost(String),

    #[error("ingress does not have any rules")]
    NoRulesDefined,

    #[error("ingress host {0:?} contains wildcards")]
    InvalidWildcardHost(String),
}

#[derive(Debug, Error)]
pub enum UrlError {
    #[error("invalid monitor URL {url:?}: {reason}")]
    Parse { url: String, reason: String },
}

/// Annotations of an ingress, empty if it has none.
pub fn ingress_annotations(ingress: &Ingress) -> &BTreeMap<String, String> {
    ingress.metadata.annotations.as_ref().unwrap_or(&NO_ANNOTATIONS)
}

/// Checks that the ingress has a single, non-wildcard host to monitor.
pub fn validate(ingress: &Ingress) -> Result<(), ValidationError> {
    if let Some(host) = tls_host(ingress) {
        if contains_wildcard(host) {
            return Err(ValidationError::InvalidWildcardTlsHost(host.to_string()));
        }
    }

    let Some(rule) = ingress
        .spec
        .as_ref()
        .and_then(|spec| spec.rules.as_ref())
        .and_then(|rules| rules.first())
    else {
        return Err(ValidationError::NoRulesDefined);
    };

    let host = rule.host.as_deref().unwrap_or_default();
    if contains_wildcard(host) {
        return Err(ValidationError::InvalidWildcardHost(host.to_string()));
    }

    Ok(())
}

/// Builds the URL the monitor checks. The ingress must have passed [`validate`].
pub fn build_monitor_url(ingress: &Ingress) -> Result<String, UrlError> {
    let raw = host_url(ingress);

    let mut url = Url::parse(&raw).map_err(|e| UrlError::Parse {
        url: raw.clone(),
        reason: e.to_string(),
    })?;

    let path_override = Annotations::new(ingress_annotations(ingress)).get(annotations::PATH_OVERRIDE);
    if let Some(path) = path_override {
        url.set_path(path);
    }

    // Keep the bare origin instead of the normalized trailing slash
    if path_override.is_none_or(str::is_empty) && url.path() == "/" && url.query().is_none() {
        return Ok(url.as_str().trim_end_matches('/').to_string());
    }

    Ok(url.to_string())
}

fn host_url(ingress: &Ingress) -> String {
    if let Some(host) = tls_host(ingress) {
        return format!("https://{}", host);
    }

    let host = rule_host(ingress);

    if force_https(ingress) {
        format!("https://{}", host)
    } else {
        format!("http://{}", host)
    }
}

fn tls_host(ingress: &Ingress) -> Option<&str> {
    ingress
        .spec
        .as_ref()?
        .tls
        .as_ref()?
        .first()?
        .hosts
        .as_ref()?
        .first()
        .map(String::as_str)
        .filter(|host| !host.is_empty())
}

fn rule_host(ingress: &Ingress) -> &str {
    ingress
        .spec
        .as_ref()
        .and_then(|spec| spec.rules.as_ref())
        .and_then(|rules| rules.first())
        .and_then(|rule| rule.host.as_deref())
        .unwrap_or_default()
}

fn force_https(ingress: &Ingress) -> bool {
    let anno = Annotations::new(ingress_annotations(ingress));

    anno.is_true(annotations::FORCE_HTTPS) || anno.is_true(annotations::NGINX_FORCE_SSL_REDIRECT)
}

fn contains_wildcard(host: &str) -> bool {
    host.contains('*')
}
