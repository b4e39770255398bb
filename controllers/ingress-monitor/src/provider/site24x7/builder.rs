//! Builds Site24x7 monitors from the provider-agnostic model.
//!
//! Every field resolves from its ingress annotation first and falls back to
//! the configured default. Afterwards the [`FINALIZERS`] run in order and
//! fill profile and group IDs that are still unset from the account.

use crate::annotations::{self, AnnotationError, Annotations};
use crate::config::Site24x7MonitorDefaults;
use crate::models;
use site24x7_client::{Monitor, Site24x7ClientTrait, Site24x7Error};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub const MONITOR_TYPE: &str = "URL";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    #[error("no {0} configured")]
    NoProfiles(Finalizer),

    #[error(transparent)]
    Api(#[from] Site24x7Error),
}

/// Auto-discovery step for one profile or group kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finalizer {
    LocationProfile,
    NotificationProfile,
    ThresholdProfile,
    MonitorGroup,
    UserGroup,
}

/// Order in which the finalizers run.
pub const FINALIZERS: [Finalizer; 5] = [
    Finalizer::LocationProfile,
    Finalizer::NotificationProfile,
    Finalizer::ThresholdProfile,
    Finalizer::MonitorGroup,
    Finalizer::UserGroup,
];

impl fmt::Display for Finalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::LocationProfile => "location profiles",
            Self::NotificationProfile => "notification profiles",
            Self::ThresholdProfile => "threshold profiles",
            Self::MonitorGroup => "monitor groups",
            Self::UserGroup => "user groups",
        };
        f.write_str(kind)
    }
}

impl Finalizer {
    fn enabled(self, defaults: &Site24x7MonitorDefaults) -> bool {
        match self {
            Self::LocationProfile => defaults.auto_location_profile,
            Self::NotificationProfile => defaults.auto_notification_profile,
            Self::ThresholdProfile => defaults.auto_threshold_profile,
            Self::MonitorGroup => defaults.auto_monitor_group,
            Self::UserGroup => defaults.auto_user_group,
        }
    }

    fn is_set(self, monitor: &Monitor) -> bool {
        match self {
            Self::LocationProfile => !monitor.location_profile_id.is_empty(),
            Self::NotificationProfile => !monitor.notification_profile_id.is_empty(),
            Self::ThresholdProfile => !monitor.threshold_profile_id.is_empty(),
            Self::MonitorGroup => !monitor.monitor_groups.is_empty(),
            Self::UserGroup => !monitor.user_group_ids.is_empty(),
        }
    }

    /// Fills the field with the first candidate of the account if
    /// auto-discovery is enabled and the field is still unset.
    pub async fn apply(
        self,
        client: &dyn Site24x7ClientTrait,
        monitor: &mut Monitor,
        defaults: &Site24x7MonitorDefaults,
    ) -> Result<(), BuildError> {
        if !self.enabled(defaults) || self.is_set(monitor) {
            return Ok(());
        }

        let first = match self {
            Self::LocationProfile => client.list_location_profiles().await?.into_iter().next().map(|p| p.profile_id),
            Self::NotificationProfile => client
                .list_notification_profiles()
                .await?
                .into_iter()
                .next()
                .map(|p| p.profile_id),
            Self::ThresholdProfile => client.list_threshold_profiles().await?.into_iter().next().map(|p| p.profile_id),
            Self::MonitorGroup => client.list_monitor_groups().await?.into_iter().next().map(|g| g.group_id),
            Self::UserGroup => client.list_user_groups().await?.into_iter().next().map(|g| g.user_group_id),
        };

        let id = first.ok_or(BuildError::NoProfiles(self))?;
        debug!("Using first of the account's {} for monitor {}: {}", self, monitor.display_name, id);

        match self {
            Self::LocationProfile => monitor.location_profile_id = id,
            Self::NotificationProfile => monitor.notification_profile_id = id,
            Self::ThresholdProfile => monitor.threshold_profile_id = id,
            Self::MonitorGroup => monitor.monitor_groups = vec![id],
            Self::UserGroup => monitor.user_group_ids = vec![id],
        }

        Ok(())
    }
}

#[derive(Clone)]
pub struct MonitorBuilder {
    client: Arc<dyn Site24x7ClientTrait>,
    defaults: Site24x7MonitorDefaults,
}

impl fmt::Debug for MonitorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorBuilder").field("defaults", &self.defaults).finish_non_exhaustive()
    }
}

impl MonitorBuilder {
    pub fn new(client: Arc<dyn Site24x7ClientTrait>, defaults: Site24x7MonitorDefaults) -> Self {
        Self { client, defaults }
    }

    /// Resolves the complete Site24x7 monitor. No partial monitor is
    /// returned if any step fails.
    pub async fn from_model(&self, model: &models::Monitor) -> Result<Monitor, BuildError> {
        let mut monitor = self.resolve_fields(model)?;

        for finalizer in FINALIZERS {
            finalizer.apply(self.client.as_ref(), &mut monitor, &self.defaults).await?;
        }

        Ok(monitor)
    }

    fn resolve_fields(&self, model: &models::Monitor) -> Result<Monitor, BuildError> {
        let anno = Annotations::new(&model.annotations);
        let defaults = &self.defaults;

        Ok(Monitor {
            monitor_id: model.id.clone(),
            display_name: model.name.clone(),
            monitor_type: MONITOR_TYPE.to_string(),
            website: model.url.clone(),
            check_frequency: anno.string_value(annotations::SITE24X7_CHECK_FREQUENCY, &defaults.check_frequency),
            http_method: anno.string_value(annotations::SITE24X7_HTTP_METHOD, &defaults.http_method),
            auth_user: anno.string_value(annotations::SITE24X7_AUTH_USER, &defaults.auth_user),
            auth_pass: anno.string_value(annotations::SITE24X7_AUTH_PASS, &defaults.auth_pass),
            match_case: anno.bool_value(annotations::SITE24X7_MATCH_CASE, defaults.match_case)?,
            user_agent: anno.string_value(annotations::SITE24X7_USER_AGENT, &defaults.user_agent),
            custom_headers: anno
                .json_value(annotations::SITE24X7_CUSTOM_HEADERS)?
                .unwrap_or_else(|| defaults.custom_headers.clone()),
            timeout: anno.int_value(annotations::SITE24X7_TIMEOUT, defaults.timeout)?,
            location_profile_id: anno
                .string_value(annotations::SITE24X7_LOCATION_PROFILE_ID, &defaults.location_profile_id),
            notification_profile_id: anno.string_value(
                annotations::SITE24X7_NOTIFICATION_PROFILE_ID,
                &defaults.notification_profile_id,
            ),
            threshold_profile_id: anno
                .string_value(annotations::SITE24X7_THRESHOLD_PROFILE_ID, &defaults.threshold_profile_id),
            monitor_groups: anno.string_list_value(annotations::SITE24X7_MONITOR_GROUP_IDS, &defaults.monitor_group_ids),
            user_group_ids: anno.string_list_value(annotations::SITE24X7_USER_GROUP_IDS, &defaults.user_group_ids),
            actions: anno
                .json_value(annotations::SITE24X7_ACTIONS)?
                .unwrap_or_else(|| defaults.actions.clone()),
            use_name_server: anno.bool_value(annotations::SITE24X7_USE_NAME_SERVER, defaults.use_name_server)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site24x7_client::{
        ActionRef, Header, LocationProfile, MockSite24x7Client, MonitorGroup, NotificationProfile,
        ThresholdProfile, UserGroup,
    };
    use std::collections::BTreeMap;

    fn model(annotations: &[(&str, &str)]) -> models::Monitor {
        models::Monitor {
            id: String::new(),
            name: "kube-system-foo".to_string(),
            url: "https://foo.bar.baz".to_string(),
            annotations: annotations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn manual_defaults() -> Site24x7MonitorDefaults {
        Site24x7MonitorDefaults {
            auto_location_profile: false,
            auto_notification_profile: false,
            auto_threshold_profile: false,
            auto_monitor_group: false,
            auto_user_group: false,
            ..Default::default()
        }
    }

    fn seeded_client() -> MockSite24x7Client {
        let client = MockSite24x7Client::new();
        client.add_location_profile(LocationProfile {
            profile_id: "456".to_string(),
            ..Default::default()
        });
        client.add_location_profile(LocationProfile {
            profile_id: "457".to_string(),
            ..Default::default()
        });
        client.add_notification_profile(NotificationProfile {
            profile_id: "789".to_string(),
            ..Default::default()
        });
        client.add_threshold_profile(ThresholdProfile {
            profile_id: "012".to_string(),
            ..Default::default()
        });
        client.add_monitor_group(MonitorGroup {
            group_id: "345".to_string(),
            ..Default::default()
        });
        client.add_user_group(UserGroup {
            user_group_id: "678".to_string(),
            ..Default::default()
        });
        client
    }

    #[tokio::test]
    async fn test_defaults_apply_without_annotations() {
        let client = Arc::new(MockSite24x7Client::new());
        let builder = MonitorBuilder::new(client.clone(), manual_defaults());

        let monitor = builder.from_model(&model(&[])).await.unwrap();

        assert_eq!(monitor.display_name, "kube-system-foo");
        assert_eq!(monitor.monitor_type, "URL");
        assert_eq!(monitor.website, "https://foo.bar.baz");
        assert_eq!(monitor.check_frequency, "1");
        assert_eq!(monitor.http_method, "G");
        assert_eq!(monitor.timeout, 10);
        assert!(monitor.use_name_server);
        assert!(monitor.custom_headers.is_empty());
        assert!(monitor.location_profile_id.is_empty());
        assert_eq!(client.call_count("list_location_profiles"), 0);
    }

    #[tokio::test]
    async fn test_annotations_override_defaults() {
        let client = Arc::new(seeded_client());
        let defaults = Site24x7MonitorDefaults {
            location_profile_id: "default-location".to_string(),
            user_group_ids: vec!["default-group".to_string()],
            ..Default::default()
        };
        let builder = MonitorBuilder::new(client.clone(), defaults);

        let monitor = builder
            .from_model(&model(&[
                (annotations::SITE24X7_CHECK_FREQUENCY, "5"),
                (annotations::SITE24X7_HTTP_METHOD, "P"),
                (annotations::SITE24X7_AUTH_USER, "user"),
                (annotations::SITE24X7_AUTH_PASS, "pass"),
                (annotations::SITE24X7_MATCH_CASE, "true"),
                (annotations::SITE24X7_USER_AGENT, "uptime-check/1.0"),
                (annotations::SITE24X7_TIMEOUT, "30"),
                (annotations::SITE24X7_USE_NAME_SERVER, "false"),
                (annotations::SITE24X7_LOCATION_PROFILE_ID, "111"),
                (annotations::SITE24X7_NOTIFICATION_PROFILE_ID, "222"),
                (annotations::SITE24X7_THRESHOLD_PROFILE_ID, "333"),
                (annotations::SITE24X7_MONITOR_GROUP_IDS, "444,555"),
                (annotations::SITE24X7_USER_GROUP_IDS, "666"),
                (annotations::SITE24X7_CUSTOM_HEADERS, r#"[{"name":"Accept","value":"text/html"}]"#),
                (annotations::SITE24X7_ACTIONS, r#"[{"action_id":"999","alert_type":0}]"#),
            ]))
            .await
            .unwrap();

        assert_eq!(monitor.check_frequency, "5");
        assert_eq!(monitor.http_method, "P");
        assert_eq!(monitor.auth_user, "user");
        assert_eq!(monitor.auth_pass, "pass");
        assert!(monitor.match_case);
        assert_eq!(monitor.user_agent, "uptime-check/1.0");
        assert_eq!(monitor.timeout, 30);
        assert!(!monitor.use_name_server);
        assert_eq!(monitor.location_profile_id, "111");
        assert_eq!(monitor.notification_profile_id, "222");
        assert_eq!(monitor.threshold_profile_id, "333");
        assert_eq!(monitor.monitor_groups, vec!["444", "555"]);
        assert_eq!(monitor.user_group_ids, vec!["666"]);
        assert_eq!(
            monitor.custom_headers,
            vec![Header { name: "Accept".to_string(), value: "text/html".to_string() }]
        );
        assert_eq!(
            monitor.actions,
            vec![ActionRef { action_id: "999".to_string(), alert_type: 0 }]
        );

        // Every field was set explicitly, so nothing is discovered
        assert_eq!(client.call_count("list_location_profiles"), 0);
        assert_eq!(client.call_count("list_user_groups"), 0);
    }

    #[tokio::test]
    async fn test_finalizers_fill_unset_fields() {
        let client = Arc::new(seeded_client());
        let builder = MonitorBuilder::new(client.clone(), Site24x7MonitorDefaults::default());

        let monitor = builder.from_model(&model(&[])).await.unwrap();

        assert_eq!(monitor.location_profile_id, "456");
        assert_eq!(monitor.notification_profile_id, "789");
        assert_eq!(monitor.threshold_profile_id, "012");
        assert_eq!(monitor.monitor_groups, vec!["345"]);
        assert_eq!(monitor.user_group_ids, vec!["678"]);
    }

    #[tokio::test]
    async fn test_finalizers_keep_configured_defaults() {
        let client = Arc::new(seeded_client());
        let defaults = Site24x7MonitorDefaults {
            notification_profile_id: "configured".to_string(),
            ..Default::default()
        };
        let builder = MonitorBuilder::new(client.clone(), defaults);

        let monitor = builder.from_model(&model(&[])).await.unwrap();

        assert_eq!(monitor.notification_profile_id, "configured");
        assert_eq!(client.call_count("list_notification_profiles"), 0);
        assert_eq!(monitor.location_profile_id, "456");
    }

    #[tokio::test]
    async fn test_finalizer_without_candidates_fails() {
        let client = Arc::new(MockSite24x7Client::new());
        client.add_location_profile(LocationProfile {
            profile_id: "456".to_string(),
            ..Default::default()
        });
        let builder = MonitorBuilder::new(client, Site24x7MonitorDefaults::default());

        let err = builder.from_model(&model(&[])).await.unwrap_err();

        assert!(matches!(err, BuildError::NoProfiles(Finalizer::NotificationProfile)));
        assert_eq!(err.to_string(), "no notification profiles configured");
    }

    #[tokio::test]
    async fn test_single_finalizer_in_isolation() {
        let client = seeded_client();
        let mut monitor = Monitor::default();

        Finalizer::MonitorGroup
            .apply(&client, &mut monitor, &Site24x7MonitorDefaults::default())
            .await
            .unwrap();
        assert_eq!(monitor.monitor_groups, vec!["345"]);

        Finalizer::UserGroup
            .apply(&client, &mut monitor, &manual_defaults())
            .await
            .unwrap();
        assert!(monitor.user_group_ids.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_annotation_fails() {
        let client = Arc::new(seeded_client());
        let builder = MonitorBuilder::new(client.clone(), Site24x7MonitorDefaults::default());

        let err = builder
            .from_model(&model(&[(annotations::SITE24X7_CUSTOM_HEADERS, "not json")]))
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::Annotation(AnnotationError::InvalidJson { .. })));
        assert_eq!(client.call_count("list_location_profiles"), 0);
    }

    #[tokio::test]
    async fn test_api_failure_during_discovery_propagates() {
        let client = Arc::new(seeded_client());
        client.fail("list_threshold_profiles", "rate limited");
        let builder = MonitorBuilder::new(client, Site24x7MonitorDefaults::default());

        let err = builder.from_model(&model(&[])).await.unwrap_err();

        assert!(matches!(err, BuildError::Api(Site24x7Error::Api(_))));
    }
}
