//! Recording provider for service tests.

use super::{MonitorProvider, ProviderError};
use crate::models::Monitor;
use site24x7_client::Site24x7Error;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory provider that records every mutation.
#[derive(Debug, Default)]
pub struct FakeProvider {
    pub monitors: Mutex<HashMap<String, Monitor>>,
    pub created: Mutex<Vec<Monitor>>,
    pub updated: Mutex<Vec<Monitor>>,
    pub deleted: Mutex<Vec<String>>,
    pub source_ranges: Vec<String>,
    /// Makes `get` fail with an API error carrying this message.
    pub get_error: Option<String>,
    /// Makes `get_ip_source_ranges` fail with an API error carrying this message.
    pub source_range_error: Option<String>,
    /// Number of upcoming `delete` calls that fail.
    pub delete_failures: AtomicUsize,
}

impl FakeProvider {
    pub fn with_monitor(monitor: Monitor) -> Self {
        let provider = Self::default();
        provider.monitors.lock().unwrap().insert(monitor.name.clone(), monitor);
        provider
    }

    pub fn created(&self) -> Vec<Monitor> {
        self.created.lock().unwrap().clone()
    }

    pub fn updated(&self) -> Vec<Monitor> {
        self.updated.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MonitorProvider for FakeProvider {
    async fn create(&self, monitor: &Monitor) -> Result<(), ProviderError> {
        self.created.lock().unwrap().push(monitor.clone());
        self.monitors.lock().unwrap().insert(monitor.name.clone(), monitor.clone());
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Monitor, ProviderError> {
        if let Some(message) = &self.get_error {
            return Err(ProviderError::List(Site24x7Error::Api(message.clone())));
        }

        self.monitors
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or(ProviderError::MonitorNotFound)
    }

    async fn update(&self, monitor: &Monitor) -> Result<(), ProviderError> {
        self.updated.lock().unwrap().push(monitor.clone());
        self.monitors.lock().unwrap().insert(monitor.name.clone(), monitor.clone());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), ProviderError> {
        let failing = self
            .delete_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ProviderError::Delete {
                id: name.to_string(),
                source: Site24x7Error::Api("service unavailable".to_string()),
            });
        }

        match self.monitors.lock().unwrap().remove(name) {
            Some(_) => {
                self.deleted.lock().unwrap().push(name.to_string());
                Ok(())
            }
            None => Err(ProviderError::MonitorNotFound),
        }
    }

    async fn get_ip_source_ranges(&self, _monitor: &Monitor) -> Result<Vec<String>, ProviderError> {
        if let Some(message) = &self.source_range_error {
            return Err(ProviderError::SourceRanges {
                profile_id: String::new(),
                source: Site24x7Error::Api(message.clone()),
            });
        }

        Ok(self.source_ranges.clone())
    }
}
