//! Site24x7Client trait for mocking
//!
//! This trait abstracts the Site24x7Client to enable mocking in unit tests.
//! The concrete Site24x7Client implements this trait, and tests can use mock implementations.

use crate::error::Site24x7Error;
use crate::models::*;

/// Trait for Site24x7 API client operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait Site24x7ClientTrait: Send + Sync {
    // Monitors
    async fn list_monitors(&self) -> Result<Vec<Monitor>, Site24x7Error>;
    async fn create_monitor(&self, monitor: &Monitor) -> Result<Monitor, Site24x7Error>;
    async fn update_monitor(&self, monitor: &Monitor) -> Result<Monitor, Site24x7Error>;
    async fn delete_monitor(&self, monitor_id: &str) -> Result<(), Site24x7Error>;

    // Profiles
    async fn list_location_profiles(&self) -> Result<Vec<LocationProfile>, Site24x7Error>;
    async fn get_location_profile(&self, profile_id: &str) -> Result<LocationProfile, Site24x7Error>;
    async fn list_notification_profiles(&self) -> Result<Vec<NotificationProfile>, Site24x7Error>;
    async fn list_threshold_profiles(&self) -> Result<Vec<ThresholdProfile>, Site24x7Error>;

    // Groups
    async fn list_monitor_groups(&self) -> Result<Vec<MonitorGroup>, Site24x7Error>;
    async fn list_user_groups(&self) -> Result<Vec<UserGroup>, Site24x7Error>;

    // Locations
    async fn list_locations(&self) -> Result<Vec<Location>, Site24x7Error>;
}
