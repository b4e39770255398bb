//! Site24x7 monitor provider.

pub mod builder;

use super::{MonitorProvider, ProviderError};
use crate::cache::ExpiringCache;
use crate::config::Site24x7Config;
use crate::models::Monitor;
use builder::MonitorBuilder;
use site24x7_client::{
    CsvIpSource, LocationIpSource, OAuthCredentials, ProfileIpProvider, Site24x7Client, Site24x7ClientTrait,
    StaticIpSource,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Location profile membership rarely changes.
const SOURCE_RANGE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Picks where check location IPs come from: the configured CSV document,
/// then the configured static map, then the list published by Site24x7.
fn ip_source(config: &Site24x7Config) -> Result<Arc<dyn LocationIpSource>, ProviderError> {
    if let Some(url) = &config.location_ips_url {
        return Ok(Arc::new(CsvIpSource::new(url.clone()).map_err(ProviderError::Init)?));
    }

    if !config.location_ips.is_empty() {
        return Ok(Arc::new(StaticIpSource::new(config.location_ips.clone())));
    }

    let source = CsvIpSource::published().map_err(ProviderError::Init)?;
    info!("Resolving Site24x7 location IPs from {}", source.url());

    Ok(Arc::new(source))
}

pub struct Site24x7Provider {
    client: Arc<dyn Site24x7ClientTrait>,
    builder: MonitorBuilder,
    ip_source: Arc<dyn LocationIpSource>,
    ip_provider: OnceCell<ProfileIpProvider>,
    source_ranges: ExpiringCache<String, Vec<String>>,
}

impl fmt::Debug for Site24x7Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Site24x7Provider")
            .field("builder", &self.builder)
            .field("ip_source", &self.ip_source)
            .finish_non_exhaustive()
    }
}

impl Site24x7Provider {
    /// Creates a provider talking to the Site24x7 API with the configured credentials.
    pub fn new(config: &Site24x7Config) -> Result<Self, ProviderError> {
        let client = Site24x7Client::new(OAuthCredentials {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            refresh_token: config.refresh_token.clone(),
        })
        .map_err(ProviderError::Init)?;

        Ok(Self::with_client(Arc::new(client), config, ip_source(config)?))
    }

    pub fn with_client(
        client: Arc<dyn Site24x7ClientTrait>,
        config: &Site24x7Config,
        ip_source: Arc<dyn LocationIpSource>,
    ) -> Self {
        Self {
            builder: MonitorBuilder::new(client.clone(), config.monitor_defaults.clone()),
            client,
            ip_source,
            ip_provider: OnceCell::new(),
            source_ranges: ExpiringCache::new(SOURCE_RANGE_TTL),
        }
    }

    async fn build(&self, monitor: &Monitor) -> Result<site24x7_client::Monitor, ProviderError> {
        self.builder
            .from_model(monitor)
            .await
            .map_err(|source| ProviderError::Build {
                name: monitor.name.clone(),
                source,
            })
    }

    async fn profile_ip_provider(&self) -> Result<&ProfileIpProvider, site24x7_client::Site24x7Error> {
        self.ip_provider
            .get_or_try_init(|| ProfileIpProvider::from_client(self.client.as_ref(), self.ip_source.clone()))
            .await
    }

    async fn resolve_source_ranges(&self, profile_id: &str) -> Result<Vec<String>, site24x7_client::Site24x7Error> {
        let ip_provider = self.profile_ip_provider().await?;
        let profile = self.client.get_location_profile(profile_id).await?;
        let ips = ip_provider.get_location_ips(&profile).await?;

        if ips.is_empty() {
            warn!(
                "No IP addresses known for the locations of profile {}, whitelists will not be extended",
                profile.profile_id
            );
        }

        debug!(
            "Found {} IP addresses for location profile {}: {:?}",
            ips.len(),
            profile.profile_id,
            ips
        );

        Ok(ips.into_iter().map(|ip| format!("{}/32", ip)).collect())
    }
}

#[async_trait::async_trait]
impl MonitorProvider for Site24x7Provider {
    async fn create(&self, monitor: &Monitor) -> Result<(), ProviderError> {
        let site24x7_monitor = self.build(monitor).await?;

        let created = self
            .client
            .create_monitor(&site24x7_monitor)
            .await
            .map_err(|source| ProviderError::Create {
                name: monitor.name.clone(),
                source,
            })?;

        info!("Created Site24x7 monitor {} with ID {}", created.display_name, created.monitor_id);
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Monitor, ProviderError> {
        let monitors = self.client.list_monitors().await.map_err(ProviderError::List)?;

        monitors
            .into_iter()
            .find(|m| m.display_name == name)
            .map(|m| Monitor {
                id: m.monitor_id,
                name: m.display_name,
                url: m.website,
                ..Default::default()
            })
            .ok_or(ProviderError::MonitorNotFound)
    }

    async fn update(&self, monitor: &Monitor) -> Result<(), ProviderError> {
        let site24x7_monitor = self.build(monitor).await?;

        self.client
            .update_monitor(&site24x7_monitor)
            .await
            .map_err(|source| ProviderError::Update {
                name: monitor.name.clone(),
                source,
            })?;

        info!("Updated Site24x7 monitor {} with ID {}", monitor.name, monitor.id);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), ProviderError> {
        let monitor = self.get(name).await?;

        self.client
            .delete_monitor(&monitor.id)
            .await
            .map_err(|source| ProviderError::Delete {
                id: monitor.id.clone(),
                source,
            })?;

        info!("Deleted Site24x7 monitor {} with ID {}", name, monitor.id);
        Ok(())
    }

    async fn get_ip_source_ranges(&self, monitor: &Monitor) -> Result<Vec<String>, ProviderError> {
        let site24x7_monitor = self.build(monitor).await?;
        let profile_id = site24x7_monitor.location_profile_id;

        if let Some(ranges) = self.source_ranges.get(&profile_id) {
            return Ok(ranges);
        }

        let ranges = self
            .resolve_source_ranges(&profile_id)
            .await
            .map_err(|source| ProviderError::SourceRanges {
                profile_id: profile_id.clone(),
                source,
            })?;

        self.source_ranges.insert(profile_id, ranges.clone());

        Ok(ranges)
    }
}
