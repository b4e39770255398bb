//! Check location IP resolution
//!
//! Site24x7 runs checks from a set of locations described by a location
//! profile. The IP addresses of each location are not part of the API
//! response, so they come from a pluggable [`LocationIpSource`].

use crate::error::Site24x7Error;
use crate::models::{Location, LocationProfile};
use crate::site24x7_trait::Site24x7ClientTrait;
use reqwest::Client;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// List of check location IPs published by Site24x7.
pub const DEFAULT_LOCATION_IPS_URL: &str = "https://www.site24x7.com/multi/location_IPs.csv";

/// Source of the current IP addresses of check locations.
#[async_trait::async_trait]
pub trait LocationIpSource: Send + Sync + std::fmt::Debug {
    /// Returns the IPs of the given locations keyed by location ID.
    /// Locations whose IPs are unknown are left out.
    async fn location_ips(&self, locations: &[&Location]) -> Result<HashMap<String, Vec<String>>, Site24x7Error>;
}

/// IP source backed by a fixed map of location ID to IP addresses.
#[derive(Debug, Clone, Default)]
pub struct StaticIpSource {
    pub location_ips: HashMap<String, Vec<String>>,
}

impl StaticIpSource {
    pub fn new(location_ips: HashMap<String, Vec<String>>) -> Self {
        Self { location_ips }
    }
}

#[async_trait::async_trait]
impl LocationIpSource for StaticIpSource {
    async fn location_ips(&self, locations: &[&Location]) -> Result<HashMap<String, Vec<String>>, Site24x7Error> {
        Ok(locations
            .iter()
            .filter_map(|location| {
                let ips = self.location_ips.get(&location.location_id)?;
                Some((location.location_id.clone(), ips.clone()))
            })
            .collect())
    }
}

/// IP source that downloads a CSV document of location IPs.
///
/// Every field of a line that is an IPv4 address is an IP of the location,
/// every other field is a name the location can be looked up by: its ID,
/// display name or city. Lines starting with `#` and lines without any IPv4
/// address are ignored, so both `<location>,<ip>[,<ip>...]` documents and the
/// published `<country>,<city>,<ip>...` list work. The document is fetched
/// once per lookup; callers are expected to cache the resolved ranges.
#[derive(Debug, Clone)]
pub struct CsvIpSource {
    client: Client,
    url: String,
}

impl CsvIpSource {
    pub fn new(url: String) -> Result<Self, Site24x7Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(Site24x7Error::Http)?;

        Ok(Self { client, url })
    }

    /// Source reading the list published by Site24x7.
    pub fn published() -> Result<Self, Site24x7Error> {
        Self::new(DEFAULT_LOCATION_IPS_URL.to_string())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<HashMap<String, Vec<String>>, Site24x7Error> {
        debug!("Fetching location IPs from {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Site24x7Error::Api(format!(
                "GET {} failed: {} - {}",
                self.url, status, body
            )));
        }

        Ok(parse_location_csv(&response.text().await?))
    }
}

#[async_trait::async_trait]
impl LocationIpSource for CsvIpSource {
    async fn location_ips(&self, locations: &[&Location]) -> Result<HashMap<String, Vec<String>>, Site24x7Error> {
        let table = self.fetch().await?;
        Ok(lookup_locations(&table, locations))
    }
}

/// Matches locations against a CSV table by ID, then display name, then city.
fn lookup_locations(table: &HashMap<String, Vec<String>>, locations: &[&Location]) -> HashMap<String, Vec<String>> {
    locations
        .iter()
        .filter_map(|location| {
            let ips = [&location.location_id, &location.display_name, &location.city_name]
                .into_iter()
                .filter(|key| !key.is_empty())
                .find_map(|key| table.get(key.as_str()))?;

            Some((location.location_id.clone(), ips.clone()))
        })
        .collect()
}

/// Parses CSV lines of location names and IPv4 addresses into a lookup table.
pub fn parse_location_csv(document: &str) -> HashMap<String, Vec<String>> {
    let mut table: HashMap<String, Vec<String>> = HashMap::new();

    for line in document.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line
            .split(',')
            .map(|field| field.trim().trim_matches('"').trim())
            .filter(|field| !field.is_empty())
            .collect();

        let ips: Vec<String> = fields
            .iter()
            .filter(|field| field.parse::<Ipv4Addr>().is_ok())
            .map(|ip| ip.to_string())
            .collect();

        if ips.is_empty() {
            continue;
        }

        // IPv6 fields are neither names nor usable as /32 ranges
        for name in fields.iter().filter(|field| field.parse::<IpAddr>().is_err()) {
            table.entry(name.to_string()).or_default().extend(ips.iter().cloned());
        }
    }

    table
}

/// Resolves the IP addresses of all locations in a location profile.
#[derive(Debug)]
pub struct ProfileIpProvider {
    pub ip_source: Arc<dyn LocationIpSource>,
    pub locations: Vec<Location>,
}

impl ProfileIpProvider {
    pub fn new(ip_source: Arc<dyn LocationIpSource>, locations: Vec<Location>) -> Self {
        Self { ip_source, locations }
    }

    /// Creates a provider with the locations currently known to the account.
    pub async fn from_client(
        client: &dyn Site24x7ClientTrait,
        ip_source: Arc<dyn LocationIpSource>,
    ) -> Result<Self, Site24x7Error> {
        let locations = client.list_locations().await?;
        debug!("Loaded {} Site24x7 check locations", locations.len());

        Ok(Self::new(ip_source, locations))
    }

    /// Returns the IPs of the primary location followed by those of the
    /// secondary locations. Locations without known IPs are skipped.
    pub async fn get_location_ips(&self, profile: &LocationProfile) -> Result<Vec<String>, Site24x7Error> {
        let location_ids = std::iter::once(&profile.primary_location)
            .filter(|id| !id.is_empty())
            .chain(profile.secondary_locations.iter());

        let mut locations = Vec::new();
        for location_id in location_ids {
            match self.locations.iter().find(|l| &l.location_id == location_id) {
                Some(location) => locations.push(location),
                None => debug!("Unknown location {} in profile {}", location_id, profile.profile_id),
            }
        }

        if locations.is_empty() {
            return Ok(Vec::new());
        }

        let location_ips = self.ip_source.location_ips(&locations).await?;
        let mut ips = Vec::new();

        for location in locations {
            match location_ips.get(&location.location_id) {
                Some(found) if !found.is_empty() => ips.extend(found.iter().cloned()),
                _ => debug!("No IP addresses known for location {}", location.location_id),
            }
        }

        Ok(ips)
    }
}
