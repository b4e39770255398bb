//! Common utilities for the Site24x7 API client
//!
//! Provides shared functionality used across all API operations.

pub mod auth;

use crate::error::Site24x7Error;
use crate::models::{ApiErrorBody, ApiResponse};
use auth::TokenSource;
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// HTTP client wrapper with authentication
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    tokens: TokenSource,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: String, tokens: TokenSource) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    async fn auth_header(&self) -> Result<String, Site24x7Error> {
        let token = self.tokens.access_token().await?;
        Ok(format!("Zoho-oauthtoken {}", token))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, Site24x7Error> {
        let url = self.build_url(path);
        debug!("{} {}", method, url);

        let mut request = self.client
            .request(method, &url)
            .header("Authorization", self.auth_header().await?)
            .header("Accept", "application/json; version=2.0");

        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(Site24x7Error::Http)
    }

    /// Make a GET request and unwrap the response envelope
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, Site24x7Error> {
        let response = self.send(Method::GET, path, None).await?;
        unwrap_envelope(Method::GET, path, response).await
    }

    /// Make a POST request and unwrap the response envelope
    pub async fn post<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Site24x7Error> {
        let body = serde_json::to_value(body)?;
        let response = self.send(Method::POST, path, Some(&body)).await?;
        unwrap_envelope(Method::POST, path, response).await
    }

    /// Make a PUT request and unwrap the response envelope
    pub async fn put<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Site24x7Error> {
        let body = serde_json::to_value(body)?;
        let response = self.send(Method::PUT, path, Some(&body)).await?;
        unwrap_envelope(Method::PUT, path, response).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<(), Site24x7Error> {
        let response = self.send(Method::DELETE, path, None).await?;
        check_status(&Method::DELETE, path, response).await?;
        Ok(())
    }
}

/// Maps non-success responses to errors, passing successful ones through.
async fn check_status(method: &Method, path: &str, response: Response) -> Result<Response, Site24x7Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body);

    match status {
        StatusCode::NOT_FOUND => Err(Site24x7Error::NotFound(format!(
            "{} {} - {}",
            method, path, message
        ))),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Site24x7Error::Authentication(format!(
            "{} {} failed: {} - {}",
            method, path, status, message
        ))),
        _ => Err(Site24x7Error::Api(format!(
            "{} {} failed: {} - {}",
            method, path, status, message
        ))),
    }
}

async fn unwrap_envelope<T: for<'de> Deserialize<'de>>(
    method: Method,
    path: &str,
    response: Response,
) -> Result<T, Site24x7Error> {
    let response = check_status(&method, path, response).await?;
    let text = response.text().await?;

    let envelope: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
        Site24x7Error::Api(format!(
            "error decoding response body: {} - Response (first 500 chars): {}",
            e,
            text.chars().take(500).collect::<String>()
        ))
    })?;

    if envelope.code != 0 {
        return Err(Site24x7Error::Api(format!(
            "{} {} failed: code {} - {}",
            method, path, envelope.code, envelope.message
        )));
    }

    envelope.data.ok_or_else(|| {
        Site24x7Error::Api(format!("{} {} returned no data", method, path))
    })
}
