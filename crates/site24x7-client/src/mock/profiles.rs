//! Profile, group and location operations for the mock client

use super::MockSite24x7Client;
use crate::error::Site24x7Error;
use crate::models::*;

pub(super) fn list_location_profiles(client: &MockSite24x7Client) -> Result<Vec<LocationProfile>, Site24x7Error> {
    client.record("list_location_profiles")?;
    Ok(client.location_profiles.lock().unwrap().clone())
}

pub(super) fn get_location_profile(
    client: &MockSite24x7Client,
    profile_id: &str,
) -> Result<LocationProfile, Site24x7Error> {
    client.record("get_location_profile")?;
    client
        .location_profiles
        .lock()
        .unwrap()
        .iter()
        .find(|p| p.profile_id == profile_id)
        .cloned()
        .ok_or_else(|| Site24x7Error::NotFound(format!("Location profile {} not found", profile_id)))
}

pub(super) fn list_notification_profiles(
    client: &MockSite24x7Client,
) -> Result<Vec<NotificationProfile>, Site24x7Error> {
    client.record("list_notification_profiles")?;
    Ok(client.notification_profiles.lock().unwrap().clone())
}

pub(super) fn list_threshold_profiles(client: &MockSite24x7Client) -> Result<Vec<ThresholdProfile>, Site24x7Error> {
    client.record("list_threshold_profiles")?;
    Ok(client.threshold_profiles.lock().unwrap().clone())
}

pub(super) fn list_monitor_groups(client: &MockSite24x7Client) -> Result<Vec<MonitorGroup>, Site24x7Error> {
    client.record("list_monitor_groups")?;
    Ok(client.monitor_groups.lock().unwrap().clone())
}

pub(super) fn list_user_groups(client: &MockSite24x7Client) -> Result<Vec<UserGroup>, Site24x7Error> {
    client.record("list_user_groups")?;
    Ok(client.user_groups.lock().unwrap().clone())
}

pub(super) fn list_locations(client: &MockSite24x7Client) -> Result<Vec<Location>, Site24x7Error> {
    client.record("list_locations")?;
    Ok(client.locations.lock().unwrap().clone())
}
