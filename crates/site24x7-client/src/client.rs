//! Site24x7 API client
//!
//! Implements the Site24x7 REST API client for website monitors and the
//! profiles and groups a monitor references.
//! Based on the Site24x7 API structure: /api/monitors, /api/location_profiles, ...

use crate::common::auth::{OAuthCredentials, TokenSource, DEFAULT_TOKEN_URL};
use crate::common::HttpClient;
use crate::error::Site24x7Error;
use crate::models::*;
use crate::site24x7_trait::Site24x7ClientTrait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default Site24x7 API base URL.
pub const DEFAULT_BASE_URL: &str = "https://www.site24x7.com/api";

/// Site24x7 API client
#[derive(Debug)]
pub struct Site24x7Client {
    http: HttpClient,
}

impl Site24x7Client {
    /// Create a new Site24x7 client against the default endpoints
    ///
    /// # Arguments
    /// * `credentials` - OAuth2 client ID, client secret and refresh token
    pub fn new(credentials: OAuthCredentials) -> Result<Self, Site24x7Error> {
        Self::with_endpoints(
            DEFAULT_BASE_URL.to_string(),
            DEFAULT_TOKEN_URL.to_string(),
            credentials,
        )
    }

    /// Create a new Site24x7 client against custom endpoints (e.g. a regional data center)
    pub fn with_endpoints(
        base_url: String,
        token_url: String,
        credentials: OAuthCredentials,
    ) -> Result<Self, Site24x7Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(Site24x7Error::Http)?;

        let tokens = TokenSource::new(client.clone(), token_url, credentials);

        Ok(Self {
            http: HttpClient::new(client, base_url, tokens),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

#[async_trait::async_trait]
impl Site24x7ClientTrait for Site24x7Client {
    async fn list_monitors(&self) -> Result<Vec<Monitor>, Site24x7Error> {
        debug!("Listing Site24x7 monitors");
        self.http.get("/monitors").await
    }

    async fn create_monitor(&self, monitor: &Monitor) -> Result<Monitor, Site24x7Error> {
        if monitor.display_name.is_empty() {
            return Err(Site24x7Error::InvalidRequest("monitor display name is required".to_string()));
        }
        self.http.post("/monitors", monitor).await
    }

    async fn update_monitor(&self, monitor: &Monitor) -> Result<Monitor, Site24x7Error> {
        if monitor.monitor_id.is_empty() {
            return Err(Site24x7Error::InvalidRequest(format!(
                "monitor {} has no ID",
                monitor.display_name
            )));
        }
        self.http.put(&format!("/monitors/{}", monitor.monitor_id), monitor).await
    }

    async fn delete_monitor(&self, monitor_id: &str) -> Result<(), Site24x7Error> {
        self.http.delete(&format!("/monitors/{}", monitor_id)).await
    }

    async fn list_location_profiles(&self) -> Result<Vec<LocationProfile>, Site24x7Error> {
        self.http.get("/location_profiles").await
    }

    async fn get_location_profile(&self, profile_id: &str) -> Result<LocationProfile, Site24x7Error> {
        self.http.get(&format!("/location_profiles/{}", profile_id)).await
    }

    async fn list_notification_profiles(&self) -> Result<Vec<NotificationProfile>, Site24x7Error> {
        self.http.get("/notification_profiles").await
    }

    async fn list_threshold_profiles(&self) -> Result<Vec<ThresholdProfile>, Site24x7Error> {
        self.http.get("/threshold_profiles").await
    }

    async fn list_monitor_groups(&self) -> Result<Vec<MonitorGroup>, Site24x7Error> {
        self.http.get("/monitor_groups").await
    }

    async fn list_user_groups(&self) -> Result<Vec<UserGroup>, Site24x7Error> {
        self.http.get("/user_groups").await
    }

    async fn list_locations(&self) -> Result<Vec<Location>, Site24x7Error> {
        let template: LocationTemplate = self.http.get("/location_template").await?;
        Ok(template.locations)
    }
}
