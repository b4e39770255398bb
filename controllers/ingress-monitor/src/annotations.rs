//! Ingress annotations recognized by the controller.
//!
//! Operator-level flags live under `ingress-monitor.bonial.com/`, monitor
//! overrides for the Site24x7 provider under
//! `site24x7.ingress-monitor.bonial.com/`. Two ingress-nginx annotations are
//! read as well: the SSL redirect flag and the source range whitelist.

use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use thiserror::Error;

/// Enables monitoring for an ingress when set to `true`.
pub const ENABLED: &str = "ingress-monitor.bonial.com/enabled";
/// Forces an `https` monitor URL even if the ingress has no TLS section.
pub const FORCE_HTTPS: &str = "ingress-monitor.bonial.com/force-https";
/// Replaces the path of the monitor URL.
pub const PATH_OVERRIDE: &str = "ingress-monitor.bonial.com/path-override";

pub const NGINX_FORCE_SSL_REDIRECT: &str = "nginx.ingress.kubernetes.io/force-ssl-redirect";
pub const NGINX_WHITELIST_SOURCE_RANGE: &str = "nginx.ingress.kubernetes.io/whitelist-source-range";

// Site24x7 monitor overrides
pub const SITE24X7_ACTIONS: &str = "site24x7.ingress-monitor.bonial.com/actions";
pub const SITE24X7_AUTH_PASS: &str = "site24x7.ingress-monitor.bonial.com/auth-pass";
pub const SITE24X7_AUTH_USER: &str = "site24x7.ingress-monitor.bonial.com/auth-user";
pub const SITE24X7_CHECK_FREQUENCY: &str = "site24x7.ingress-monitor.bonial.com/check-frequency";
pub const SITE24X7_CUSTOM_HEADERS: &str = "site24x7.ingress-monitor.bonial.com/custom-headers";
pub const SITE24X7_HTTP_METHOD: &str = "site24x7.ingress-monitor.bonial.com/http-method";
pub const SITE24X7_LOCATION_PROFILE_ID: &str = "site24x7.ingress-monitor.bonial.com/location-profile-id";
pub const SITE24X7_MATCH_CASE: &str = "site24x7.ingress-monitor.bonial.com/match-case";
pub const SITE24X7_MONITOR_GROUP_IDS: &str = "site24x7.ingress-monitor.bonial.com/monitor-group-ids";
pub const SITE24X7_NOTIFICATION_PROFILE_ID: &str = "site24x7.ingress-monitor.bonial.com/notification-profile-id";
pub const SITE24X7_THRESHOLD_PROFILE_ID: &str = "site24x7.ingress-monitor.bonial.com/threshold-profile-id";
pub const SITE24X7_TIMEOUT: &str = "site24x7.ingress-monitor.bonial.com/timeout";
pub const SITE24X7_USE_NAME_SERVER: &str = "site24x7.ingress-monitor.bonial.com/use-name-server";
pub const SITE24X7_USER_AGENT: &str = "site24x7.ingress-monitor.bonial.com/user-agent";
pub const SITE24X7_USER_GROUP_IDS: &str = "site24x7.ingress-monitor.bonial.com/user-group-ids";

/// Errors for annotations that are present but malformed.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("invalid bool value {value:?} for annotation {key}")]
    InvalidBool { key: String, value: String },

    #[error("invalid int value {value:?} for annotation {key}: {source}")]
    InvalidInt {
        key: String,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("invalid JSON value {value:?} for annotation {key}: {source}")]
    InvalidJson {
        key: String,
        value: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Typed read access to an annotation map.
///
/// Absent keys yield the supplied default. Present keys that cannot be
/// parsed are errors.
#[derive(Debug, Clone, Copy)]
pub struct Annotations<'a> {
    map: &'a BTreeMap<String, String>,
}

impl<'a> Annotations<'a> {
    pub fn new(map: &'a BTreeMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn string_value(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    pub fn bool_value(&self, key: &str, default: bool) -> Result<bool, AnnotationError> {
        match self.get(key) {
            Some(value) => parse_bool(value).ok_or_else(|| AnnotationError::InvalidBool {
                key: key.to_string(),
                value: value.to_string(),
            }),
            None => Ok(default),
        }
    }

    pub fn int_value(&self, key: &str, default: i64) -> Result<i64, AnnotationError> {
        match self.get(key) {
            Some(value) => value.trim().parse().map_err(|source| AnnotationError::InvalidInt {
                key: key.to_string(),
                value: value.to_string(),
                source,
            }),
            None => Ok(default),
        }
    }

    /// Comma separated list. Blank items are dropped.
    pub fn string_list_value(&self, key: &str, default: &[String]) -> Vec<String> {
        match self.get(key) {
            Some(value) => value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            None => default.to_vec(),
        }
    }

    /// Decodes a JSON annotation. Returns `None` when the key is absent.
    pub fn json_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AnnotationError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };

        serde_json::from_str(value)
            .map(Some)
            .map_err(|source| AnnotationError::InvalidJson {
                key: key.to_string(),
                value: value.to_string(),
                source,
            })
    }

    /// True only if the key holds a well-formed true value.
    pub fn is_true(&self, key: &str) -> bool {
        self.get(key).and_then(parse_bool).unwrap_or(false)
    }
}

/// Accepts the same spellings as Go's `strconv.ParseBool`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
