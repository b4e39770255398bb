//! OAuth2 access token handling
//!
//! Site24x7 authenticates API calls with short-lived Zoho OAuth access tokens
//! minted from a long-lived refresh token.

use crate::error::Site24x7Error;
use crate::models::TokenResponse;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::debug;

/// Default Zoho accounts token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.zoho.com/oauth/v2/token";

/// Tokens are refreshed this many seconds before they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth2 client credentials issued by Site24x7.
#[derive(Clone, Default)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Mints and caches access tokens.
#[derive(Debug)]
pub struct TokenSource {
    client: Client,
    token_url: String,
    credentials: OAuthCredentials,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(client: Client, token_url: String, credentials: OAuthCredentials) -> Self {
        Self {
            client,
            token_url,
            credentials,
            cached: Mutex::new(None),
        }
    }

    /// Returns a valid access token, refreshing it if it is missing or about to expire.
    pub async fn access_token(&self) -> Result<String, Site24x7Error> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at > Utc::now() {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.refresh().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);

        Ok(access_token)
    }

    async fn refresh(&self) -> Result<CachedToken, Site24x7Error> {
        debug!("Refreshing Site24x7 access token");

        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self.client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(Site24x7Error::Authentication(format!(
                "token refresh failed: {} - {}",
                status, body
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;

        // Zoho answers invalid grants with HTTP 200 and an error field
        if let Some(error) = token.error {
            return Err(Site24x7Error::Authentication(format!("token refresh failed: {}", error)));
        }

        let access_token = token.access_token.ok_or_else(|| {
            Site24x7Error::Authentication("token response did not contain an access token".to_string())
        })?;

        let lifetime = token.expires_in.unwrap_or(3600) - EXPIRY_MARGIN_SECS;

        Ok(CachedToken {
            access_token,
            expires_at: Utc::now() + ChronoDuration::seconds(lifetime.max(0)),
        })
    }
}
