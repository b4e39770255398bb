//! Monitor operations for the mock client

use super::MockSite24x7Client;
use crate::error::Site24x7Error;
use crate::models::Monitor;

pub(super) fn list_monitors(client: &MockSite24x7Client) -> Result<Vec<Monitor>, Site24x7Error> {
    client.record("list_monitors")?;
    Ok(client.monitors())
}

pub(super) fn create_monitor(client: &MockSite24x7Client, monitor: &Monitor) -> Result<Monitor, Site24x7Error> {
    client.record("create_monitor")?;

    let mut created = monitor.clone();
    created.monitor_id = client.next_id();
    client.add_monitor(created.clone());

    Ok(created)
}

pub(super) fn update_monitor(client: &MockSite24x7Client, monitor: &Monitor) -> Result<Monitor, Site24x7Error> {
    client.record("update_monitor")?;

    let mut monitors = client.monitors.lock().unwrap();
    match monitors.get_mut(&monitor.monitor_id) {
        Some(existing) => {
            *existing = monitor.clone();
            Ok(monitor.clone())
        }
        None => Err(Site24x7Error::NotFound(format!("Monitor {} not found", monitor.monitor_id))),
    }
}

pub(super) fn delete_monitor(client: &MockSite24x7Client, monitor_id: &str) -> Result<(), Site24x7Error> {
    client.record("delete_monitor")?;
    client
        .monitors
        .lock()
        .unwrap()
        .remove(monitor_id)
        .map(|_| ())
        .ok_or_else(|| Site24x7Error::NotFound(format!("Monitor {} not found", monitor_id)))
}
