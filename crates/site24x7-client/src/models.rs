//! Site24x7 API models
//!
//! These models match the JSON representations of the Site24x7 REST API.
//! See: https://www.site24x7.com/help/api/

use serde::{Deserialize, Serialize};

/// Envelope that wraps every Site24x7 API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// Error body returned by the API for non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub message: String,
}

/// Website monitor matching the Site24x7 "URL" monitor type.
///
/// Monitor listings include every monitor type of the account, most of which
/// carry no `website`, so the identifying fields all default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monitor {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub monitor_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, rename = "type")]
    pub monitor_type: String,
    #[serde(default)]
    pub website: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub check_frequency: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub http_method: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auth_user: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub auth_pass: String,
    #[serde(default)]
    pub match_case: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_agent: String,
    #[serde(default)]
    pub custom_headers: Vec<Header>,
    #[serde(default)]
    pub timeout: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location_profile_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notification_profile_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub threshold_profile_id: String,
    #[serde(default)]
    pub monitor_groups: Vec<String>,
    #[serde(default)]
    pub user_group_ids: Vec<String>,
    #[serde(default, rename = "action_ids")]
    pub actions: Vec<ActionRef>,
    #[serde(default)]
    pub use_name_server: bool,
}

/// Custom HTTP header sent with every check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Reference to an IT automation action fired on a status change.
///
/// `alert_type` is one of the Site24x7 status constants
/// (0 = down, 1 = up, 2 = trouble, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRef {
    pub action_id: String,
    pub alert_type: i64,
}

/// Location profile: the set of check locations a monitor runs from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationProfile {
    pub profile_id: String,
    #[serde(default)]
    pub profile_name: String,
    #[serde(default)]
    pub primary_location: String,
    #[serde(default)]
    pub secondary_locations: Vec<String>,
    #[serde(default)]
    pub restrict_alt_loc: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationProfile {
    pub profile_id: String,
    #[serde(default)]
    pub profile_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdProfile {
    pub profile_id: String,
    #[serde(default)]
    pub profile_name: String,
    #[serde(default, rename = "type")]
    pub profile_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorGroup {
    pub group_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    pub user_group_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub users: Vec<String>,
}

/// Check location as listed by the location template endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub location_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub city_name: String,
    #[serde(default)]
    pub country_name: String,
}

/// Payload of `GET /location_template`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationTemplate {
    #[serde(default)]
    pub locations: Vec<Location>,
}

/// OAuth2 token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_serializes_api_field_names() {
        let monitor = Monitor {
            display_name: "kube-system-foo".to_string(),
            monitor_type: "URL".to_string(),
            website: "https://foo.bar.baz".to_string(),
            actions: vec![ActionRef { action_id: "123".to_string(), alert_type: 1 }],
            ..Default::default()
        };

        let json = serde_json::to_value(&monitor).unwrap();
        assert_eq!(json["type"], "URL");
        assert_eq!(json["action_ids"][0]["action_id"], "123");
        // Unassigned IDs are omitted so the API assigns one on create
        assert!(json.get("monitor_id").is_none());
        assert!(json.get("location_profile_id").is_none());
    }

    #[test]
    fn test_envelope_deserializes_monitor_list() {
        let body = r#"{
            "code": 0,
            "message": "success",
            "data": [
                {"monitor_id": "42", "display_name": "foo", "type": "URL", "website": "http://foo"}
            ]
        }"#;

        let response: ApiResponse<Vec<Monitor>> = serde_json::from_str(body).unwrap();
        let monitors = response.data.unwrap();
        assert_eq!(monitors.len(), 1);
        assert_eq!(monitors[0].monitor_id, "42");
        assert!(monitors[0].custom_headers.is_empty());
    }

    #[test]
    fn test_envelope_deserializes_mixed_monitor_types() {
        let body = r#"{
            "code": 0,
            "message": "success",
            "data": [
                {"monitor_id": "1", "display_name": "db-host", "type": "SERVER"},
                {"monitor_id": "2", "display_name": "dns", "type": "PING", "timeout": 10},
                {"monitor_id": "3", "display_name": "foo", "type": "URL", "website": "http://foo"}
            ]
        }"#;

        let response: ApiResponse<Vec<Monitor>> = serde_json::from_str(body).unwrap();
        let monitors = response.data.unwrap();
        assert_eq!(monitors.len(), 3);
        assert_eq!(monitors[0].monitor_type, "SERVER");
        assert!(monitors[0].website.is_empty());
        assert_eq!(monitors[2].website, "http://foo");
    }

    #[test]
    fn test_envelope_without_data() {
        let body = r#"{"code": 0, "message": "success"}"#;

        let response: ApiResponse<Vec<Monitor>> = serde_json::from_str(body).unwrap();
        assert!(response.data.is_none());
    }
}
