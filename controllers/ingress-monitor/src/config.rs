//! Controller configuration.
//!
//! Operational settings come from environment variables. Provider settings
//! (credentials and monitor defaults) come from an optional YAML file; any
//! credential left empty there is read from the environment instead.

use crate::namer::DEFAULT_NAME_TEMPLATE;
use crate::provider::ProviderKind;
use serde::Deserialize;
use site24x7_client::{ActionRef, Header};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidEnv { name: String, value: String, reason: String },

    #[error("unsupported provider {0:?}")]
    UnsupportedProvider(String),

    #[error("failed to read provider config {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse provider config {path}: {source}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{0}")]
    Invalid(String),
}

/// Operational settings of the controller.
#[derive(Debug, Clone)]
pub struct Options {
    pub provider: ProviderKind,
    pub name_template: String,
    /// Leave monitors in place when ingresses go away or get disabled.
    pub no_delete: bool,
    /// Minimum ingress age before a monitor is created.
    pub creation_delay: Duration,
    pub provider_config_file: Option<PathBuf>,
    pub watch_namespace: Option<String>,
    pub metrics_addr: SocketAddr,
}

impl Options {
    /// Reads the options from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the options through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let provider = match var("PROVIDER") {
            Some(name) => name.parse()?,
            None => ProviderKind::Site24x7,
        };

        let no_delete = match var("NO_DELETE") {
            Some(value) => crate::annotations::parse_bool(&value).ok_or_else(|| ConfigError::InvalidEnv {
                name: "NO_DELETE".to_string(),
                value: value.clone(),
                reason: "expected a boolean".to_string(),
            })?,
            None => false,
        };

        let creation_delay = match var("CREATION_DELAY") {
            Some(value) => parse_duration(&value).map_err(|reason| ConfigError::InvalidEnv {
                name: "CREATION_DELAY".to_string(),
                value: value.clone(),
                reason,
            })?,
            None => Duration::ZERO,
        };

        let raw_addr = var("METRICS_ADDR").unwrap_or_else(|| DEFAULT_METRICS_ADDR.to_string());
        let metrics_addr: SocketAddr = raw_addr.parse().map_err(|e: std::net::AddrParseError| ConfigError::InvalidEnv {
            name: "METRICS_ADDR".to_string(),
            value: raw_addr.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            provider,
            name_template: var("NAME_TEMPLATE").unwrap_or_else(|| DEFAULT_NAME_TEMPLATE.to_string()),
            no_delete,
            creation_delay,
            provider_config_file: var("PROVIDER_CONFIG_FILE").map(PathBuf::from),
            watch_namespace: var("WATCH_NAMESPACE"),
            metrics_addr,
        })
    }

    /// Checks the options against the loaded provider configuration.
    pub fn validate(&self, provider_config: &ProviderConfig) -> Result<(), ConfigError> {
        if self.name_template.trim().is_empty() {
            return Err(ConfigError::Invalid("name template must not be empty".to_string()));
        }

        if self.provider == ProviderKind::Site24x7 {
            let site24x7 = &provider_config.site24x7;
            let missing: Vec<&str> = [
                ("clientID", &site24x7.client_id),
                ("clientSecret", &site24x7.client_secret),
                ("refreshToken", &site24x7.refresh_token),
            ]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
            .collect();

            if !missing.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "missing site24x7 credentials: {}",
                    missing.join(", ")
                )));
            }
        }

        Ok(())
    }
}

/// Configuration of all supported monitor providers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub site24x7: Site24x7Config,
}

impl ProviderConfig {
    /// Loads the provider config file if given and fills empty credentials
    /// from `SITE24X7_CLIENT_ID`, `SITE24X7_CLIENT_SECRET` and `SITE24X7_REFRESH_TOKEN`.
    pub fn load(path: Option<&Path>, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None => Self::default(),
        };

        let site24x7 = &mut config.site24x7;
        for (value, name) in [
            (&mut site24x7.client_id, "SITE24X7_CLIENT_ID"),
            (&mut site24x7.client_secret, "SITE24X7_CLIENT_SECRET"),
            (&mut site24x7.refresh_token, "SITE24X7_REFRESH_TOKEN"),
        ] {
            if value.is_empty() {
                *value = lookup(name).unwrap_or_default();
            }
        }

        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&contents).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as null
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }
}

/// Site24x7 provider configuration.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Site24x7Config {
    #[serde(rename = "clientID")]
    pub client_id: String,
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(rename = "monitorDefaults")]
    pub monitor_defaults: Site24x7MonitorDefaults,
    /// Check location ID to the IP addresses checks originate from.
    #[serde(rename = "locationIPs")]
    pub location_ips: HashMap<String, Vec<String>>,
    /// CSV document of location IPs, takes precedence over `locationIPs`.
    /// Without either, the list published by Site24x7 is used.
    #[serde(rename = "locationIPsURL")]
    pub location_ips_url: Option<String>,
}

impl std::fmt::Debug for Site24x7Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site24x7Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("monitor_defaults", &self.monitor_defaults)
            .field("location_ips", &self.location_ips)
            .field("location_ips_url", &self.location_ips_url)
            .finish()
    }
}

/// Defaults applied to every Site24x7 monitor unless overridden by an
/// ingress annotation. The `auto_*` flags pick the first profile or group
/// of the account when no ID is configured.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Site24x7MonitorDefaults {
    pub actions: Vec<ActionRef>,
    #[serde(rename = "authPass")]
    pub auth_pass: String,
    #[serde(rename = "authUser")]
    pub auth_user: String,
    #[serde(rename = "autoLocationProfile")]
    pub auto_location_profile: bool,
    #[serde(rename = "autoNotificationProfile")]
    pub auto_notification_profile: bool,
    #[serde(rename = "autoThresholdProfile")]
    pub auto_threshold_profile: bool,
    #[serde(rename = "autoMonitorGroup")]
    pub auto_monitor_group: bool,
    #[serde(rename = "autoUserGroup")]
    pub auto_user_group: bool,
    #[serde(rename = "checkFrequency")]
    pub check_frequency: String,
    #[serde(rename = "customHeaders")]
    pub custom_headers: Vec<Header>,
    #[serde(rename = "httpMethod")]
    pub http_method: String,
    #[serde(rename = "locationProfileID")]
    pub location_profile_id: String,
    #[serde(rename = "matchCase")]
    pub match_case: bool,
    #[serde(rename = "monitorGroupIDs")]
    pub monitor_group_ids: Vec<String>,
    #[serde(rename = "notificationProfileID")]
    pub notification_profile_id: String,
    #[serde(rename = "thresholdProfileID")]
    pub threshold_profile_id: String,
    /// Seconds, 1 to 45.
    pub timeout: i64,
    #[serde(rename = "useNameServer")]
    pub use_name_server: bool,
    #[serde(rename = "userAgent")]
    pub user_agent: String,
    #[serde(rename = "userGroupIDs")]
    pub user_group_ids: Vec<String>,
}

impl Default for Site24x7MonitorDefaults {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
            auth_pass: String::new(),
            auth_user: String::new(),
            auto_location_profile: true,
            auto_notification_profile: true,
            auto_threshold_profile: true,
            auto_monitor_group: true,
            auto_user_group: true,
            check_frequency: "1".to_string(),
            custom_headers: Vec::new(),
            http_method: "G".to_string(),
            location_profile_id: String::new(),
            match_case: false,
            monitor_group_ids: Vec::new(),
            notification_profile_id: String::new(),
            threshold_profile_id: String::new(),
            timeout: 10,
            use_name_server: true,
            user_agent: String::new(),
            user_group_ids: Vec::new(),
        }
    }
}

/// Parses durations like `90`, `30s`, `5m`, `1h` or `1h30m`. Bare numbers are seconds.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }

    let mut total = Duration::ZERO;
    let mut digits = String::new();

    for c in value.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let amount: u64 = digits.parse().map_err(|_| format!("missing number before unit {:?}", c))?;
        digits.clear();

        let unit = match c {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            _ => return Err(format!("unknown unit {:?}", c)),
        };

        total = amount
            .checked_mul(unit)
            .and_then(|seconds| total.checked_add(Duration::from_secs(seconds)))
            .ok_or_else(|| format!("duration {:?} is too large", value))?;
    }

    if !digits.is_empty() {
        return Err(format!("missing unit after {}", digits));
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(entries: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_options_defaults() {
        let options = Options::from_lookup(lookup(&[])).unwrap();

        assert_eq!(options.provider, ProviderKind::Site24x7);
        assert_eq!(options.name_template, DEFAULT_NAME_TEMPLATE);
        assert!(!options.no_delete);
        assert_eq!(options.creation_delay, Duration::ZERO);
        assert_eq!(options.metrics_addr, "0.0.0.0:8080".parse().unwrap());
        assert!(options.watch_namespace.is_none());
        assert!(options.provider_config_file.is_none());
    }

    #[test]
    fn test_options_from_env() {
        let options = Options::from_lookup(lookup(&[
            ("PROVIDER", "null"),
            ("NAME_TEMPLATE", "{{ ingress_name }}"),
            ("NO_DELETE", "true"),
            ("CREATION_DELAY", "5m"),
            ("WATCH_NAMESPACE", "shop"),
            ("METRICS_ADDR", "127.0.0.1:9090"),
            ("PROVIDER_CONFIG_FILE", "/etc/ingress-monitor/config.yaml"),
        ]))
        .unwrap();

        assert_eq!(options.provider, ProviderKind::Null);
        assert_eq!(options.name_template, "{{ ingress_name }}");
        assert!(options.no_delete);
        assert_eq!(options.creation_delay, Duration::from_secs(300));
        assert_eq!(options.watch_namespace.as_deref(), Some("shop"));
        assert_eq!(options.metrics_addr, "127.0.0.1:9090".parse().unwrap());
        assert_eq!(
            options.provider_config_file,
            Some(PathBuf::from("/etc/ingress-monitor/config.yaml"))
        );
    }

    #[test]
    fn test_options_reject_invalid_values() {
        assert!(matches!(
            Options::from_lookup(lookup(&[("PROVIDER", "pingdom")])),
            Err(ConfigError::UnsupportedProvider(_))
        ));
        assert!(matches!(
            Options::from_lookup(lookup(&[("NO_DELETE", "maybe")])),
            Err(ConfigError::InvalidEnv { .. })
        ));
        assert!(matches!(
            Options::from_lookup(lookup(&[("CREATION_DELAY", "5 minutes")])),
            Err(ConfigError::InvalidEnv { .. })
        ));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("0"), Ok(Duration::ZERO));
        assert_eq!(parse_duration("90"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_duration("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("1h30m"), Ok(Duration::from_secs(5400)));
        assert!(parse_duration("m").is_err());
        assert!(parse_duration("10d").is_err());
        assert!(parse_duration("1h30").is_err());
    }

    #[test]
    fn test_parse_duration_overflow() {
        assert!(parse_duration("9999999999999999h").is_err());
        assert!(parse_duration("18446744073709551615s1s").is_err());
        assert!(matches!(
            Options::from_lookup(lookup(&[("CREATION_DELAY", "9999999999999999h")])),
            Err(ConfigError::InvalidEnv { .. })
        ));
    }

    #[test]
    fn test_provider_config_file_overrides_defaults() {
        let config = ProviderConfig::parse(
            r#"
site24x7:
  clientID: file-client
  monitorDefaults:
    autoUserGroup: false
    httpMethod: P
    timeout: 30
    userGroupIDs: ["123"]
    customHeaders:
      - name: X-Monitor
        value: site24x7
  locationIPs:
    "1": ["1.2.3.4"]
"#,
        )
        .unwrap();

        let defaults = &config.site24x7.monitor_defaults;
        assert_eq!(config.site24x7.client_id, "file-client");
        assert!(!defaults.auto_user_group);
        assert!(defaults.auto_location_profile);
        assert_eq!(defaults.http_method, "P");
        assert_eq!(defaults.check_frequency, "1");
        assert_eq!(defaults.timeout, 30);
        assert_eq!(defaults.user_group_ids, vec!["123"]);
        assert_eq!(defaults.custom_headers[0].name, "X-Monitor");
        assert_eq!(config.site24x7.location_ips["1"], vec!["1.2.3.4"]);
    }

    #[test]
    fn test_provider_config_credentials_fall_back_to_env() {
        let config = ProviderConfig::load(
            None,
            lookup(&[
                ("SITE24X7_CLIENT_ID", "id"),
                ("SITE24X7_CLIENT_SECRET", "secret"),
                ("SITE24X7_REFRESH_TOKEN", "token"),
            ]),
        )
        .unwrap();

        assert_eq!(config.site24x7.client_id, "id");
        assert_eq!(config.site24x7.client_secret, "secret");
        assert_eq!(config.site24x7.refresh_token, "token");
        assert_eq!(config.site24x7.monitor_defaults, Site24x7MonitorDefaults::default());
    }

    #[test]
    fn test_validate() {
        let options = Options::from_lookup(lookup(&[])).unwrap();

        let err = options.validate(&ProviderConfig::default()).unwrap_err();
        assert!(err.to_string().contains("clientID, clientSecret, refreshToken"));

        let null_options = Options::from_lookup(lookup(&[("PROVIDER", "null")])).unwrap();
        assert!(null_options.validate(&ProviderConfig::default()).is_ok());

        let mut blank_template = null_options.clone();
        blank_template.name_template = " ".to_string();
        assert!(blank_template.validate(&ProviderConfig::default()).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let err = ProviderConfig::load(Some(Path::new("/nonexistent/config.yaml")), lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
