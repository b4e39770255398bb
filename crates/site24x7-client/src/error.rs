//! Site24x7 client errors

use thiserror::Error;

/// Errors that can occur when interacting with the Site24x7 API
#[derive(Debug, Error)]
pub enum Site24x7Error {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Site24x7 API returned an error
    #[error("Site24x7 API error: {0}")]
    Api(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// OAuth token refresh failed (invalid client credentials or refresh token)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g., missing required fields)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl Site24x7Error {
    /// Returns true if the API reported the resource as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Site24x7Error::NotFound(_))
    }
}
