//! Mock Site24x7Client for unit testing
//!
//! This module provides a mock implementation of Site24x7ClientTrait that can be used
//! in unit tests without talking to the Site24x7 API.
//!
//! The mock is organized into domain-specific modules:
//! - `monitors.rs` - Monitor CRUD operations
//! - `profiles.rs` - Profiles, groups and check locations

mod monitors;
mod profiles;

use crate::error::Site24x7Error;
use crate::models::*;
use crate::site24x7_trait::Site24x7ClientTrait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock Site24x7Client for testing
///
/// Resources live in memory. Every trait call is counted, and individual
/// operations can be made to fail with [`MockSite24x7Client::fail`].
#[derive(Debug, Clone, Default)]
pub struct MockSite24x7Client {
    pub(crate) monitors: Arc<Mutex<HashMap<String, Monitor>>>,
    pub(crate) location_profiles: Arc<Mutex<Vec<LocationProfile>>>,
    pub(crate) notification_profiles: Arc<Mutex<Vec<NotificationProfile>>>,
    pub(crate) threshold_profiles: Arc<Mutex<Vec<ThresholdProfile>>>,
    pub(crate) monitor_groups: Arc<Mutex<Vec<MonitorGroup>>>,
    pub(crate) user_groups: Arc<Mutex<Vec<UserGroup>>>,
    pub(crate) locations: Arc<Mutex<Vec<Location>>>,
    pub(crate) failures: Arc<Mutex<HashMap<String, String>>>,
    pub(crate) calls: Arc<Mutex<HashMap<String, usize>>>,
    pub(crate) next_id: Arc<Mutex<u64>>,
}

impl MockSite24x7Client {
    /// Create a new, empty mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a monitor to the mock store (for test setup)
    pub fn add_monitor(&self, monitor: Monitor) {
        self.monitors.lock().unwrap().insert(monitor.monitor_id.clone(), monitor);
    }

    /// All monitors currently stored, ordered by ID
    pub fn monitors(&self) -> Vec<Monitor> {
        let mut monitors: Vec<Monitor> = self.monitors.lock().unwrap().values().cloned().collect();
        monitors.sort_by(|a, b| a.monitor_id.cmp(&b.monitor_id));
        monitors
    }

    pub fn add_location_profile(&self, profile: LocationProfile) {
        self.location_profiles.lock().unwrap().push(profile);
    }

    pub fn add_notification_profile(&self, profile: NotificationProfile) {
        self.notification_profiles.lock().unwrap().push(profile);
    }

    pub fn add_threshold_profile(&self, profile: ThresholdProfile) {
        self.threshold_profiles.lock().unwrap().push(profile);
    }

    pub fn add_monitor_group(&self, group: MonitorGroup) {
        self.monitor_groups.lock().unwrap().push(group);
    }

    pub fn add_user_group(&self, group: UserGroup) {
        self.user_groups.lock().unwrap().push(group);
    }

    pub fn add_location(&self, location: Location) {
        self.locations.lock().unwrap().push(location);
    }

    /// Make every subsequent call of `operation` fail with an API error
    pub fn fail(&self, operation: &str, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(operation.to_string(), message.to_string());
    }

    /// Number of times `operation` has been called
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls.lock().unwrap().get(operation).copied().unwrap_or(0)
    }

    /// Record a call and return the configured failure, if any
    pub(crate) fn record(&self, operation: &str) -> Result<(), Site24x7Error> {
        *self.calls.lock().unwrap().entry(operation.to_string()).or_insert(0) += 1;

        match self.failures.lock().unwrap().get(operation) {
            Some(message) => Err(Site24x7Error::Api(message.clone())),
            None => Ok(()),
        }
    }

    /// Generate next ID
    pub(crate) fn next_id(&self) -> String {
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        id.to_string()
    }
}

#[async_trait::async_trait]
impl Site24x7ClientTrait for MockSite24x7Client {
    // Monitors - delegated to monitors module
    async fn list_monitors(&self) -> Result<Vec<Monitor>, Site24x7Error> {
        monitors::list_monitors(self)
    }

    async fn create_monitor(&self, monitor: &Monitor) -> Result<Monitor, Site24x7Error> {
        monitors::create_monitor(self, monitor)
    }

    async fn update_monitor(&self, monitor: &Monitor) -> Result<Monitor, Site24x7Error> {
        monitors::update_monitor(self, monitor)
    }

    async fn delete_monitor(&self, monitor_id: &str) -> Result<(), Site24x7Error> {
        monitors::delete_monitor(self, monitor_id)
    }

    // Profiles, groups and locations - delegated to profiles module
    async fn list_location_profiles(&self) -> Result<Vec<LocationProfile>, Site24x7Error> {
        profiles::list_location_profiles(self)
    }

    async fn get_location_profile(&self, profile_id: &str) -> Result<LocationProfile, Site24x7Error> {
        profiles::get_location_profile(self, profile_id)
    }

    async fn list_notification_profiles(&self) -> Result<Vec<NotificationProfile>, Site24x7Error> {
        profiles::list_notification_profiles(self)
    }

    async fn list_threshold_profiles(&self) -> Result<Vec<ThresholdProfile>, Site24x7Error> {
        profiles::list_threshold_profiles(self)
    }

    async fn list_monitor_groups(&self) -> Result<Vec<MonitorGroup>, Site24x7Error> {
        profiles::list_monitor_groups(self)
    }

    async fn list_user_groups(&self) -> Result<Vec<UserGroup>, Site24x7Error> {
        profiles::list_user_groups(self)
    }

    async fn list_locations(&self) -> Result<Vec<Location>, Site24x7Error> {
        profiles::list_locations(self)
    }
}
