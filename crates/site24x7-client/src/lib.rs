//! Site24x7 REST API Client
//!
//! A Rust client library for the Site24x7 website monitoring API.
//! Provides type-safe models for monitors and the profiles they reference.
//!
//! # Example
//!
//! ```no_run
//! use site24x7_client::{Monitor, OAuthCredentials, Site24x7Client, Site24x7ClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Site24x7Client::new(OAuthCredentials {
//!     client_id: "client-id".to_string(),
//!     client_secret: "client-secret".to_string(),
//!     refresh_token: "refresh-token".to_string(),
//! })?;
//!
//! let monitor = client
//!     .create_monitor(&Monitor {
//!         display_name: "default-shop".to_string(),
//!         monitor_type: "URL".to_string(),
//!         website: "https://shop.example.com".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! client.delete_monitor(&monitor.monitor_id).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Monitors**: List, create, update and delete website monitors
//! - **Profiles**: Query location, notification and threshold profiles
//! - **OAuth**: Access tokens are refreshed transparently from a refresh token
//! - **Locations**: Resolve the IP addresses a location profile checks from

pub mod client;
pub mod common;
pub mod error;
pub mod location;
pub mod models;
#[path = "trait.rs"]
pub mod site24x7_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::Site24x7Client;
pub use common::HttpClient;
pub use common::auth::{OAuthCredentials, TokenSource};
pub use error::Site24x7Error;
pub use location::{CsvIpSource, DEFAULT_LOCATION_IPS_URL, LocationIpSource, ProfileIpProvider, StaticIpSource};
pub use models::*;
pub use site24x7_trait::Site24x7ClientTrait;
#[cfg(feature = "test-util")]
pub use mock::MockSite24x7Client;
