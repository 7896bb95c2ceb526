//! Wire-level HTTP round trips.

use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::ApiError;

/// A fully built outbound request
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub method: http::Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// A raw response: status code and body bytes
#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl WireResponse {
    /// Create a new response
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs one HTTP round trip.
///
/// An `Err` means no response was received at all; implementations report it
/// as [`ApiError::Connection`]. Status codes are not interpreted here.
#[async_trait]
pub trait ApiSession: Send + Sync + std::fmt::Debug {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, ApiError>;
}

/// Session backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestSession {
    client: Arc<Client>,
}

impl ReqwestSession {
    /// Create a session with default settings
    pub fn new() -> Result<Self, ApiError> {
        Self::with_settings(
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
            Duration::from_secs(30),
            Duration::from_secs(10),
        )
    }

    /// Create a session with a custom user agent and timeouts
    pub fn with_settings(
        user_agent: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| ApiError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }
}

#[async_trait]
impl ApiSession for ReqwestSession {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, ApiError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Connection(e.to_string()))?;

        let status = response.status();
        let body = response.bytes().await.map(|bytes| bytes.to_vec());

        Ok(WireResponse::new(status, read_body(status, body)?))
    }
}

/// Resolve a body read.
///
/// A failed read only counts as a connection failure for success statuses; an
/// error status is still reported, with an empty body.
fn read_body<E: std::fmt::Display>(
    status: StatusCode,
    body: Result<Vec<u8>, E>,
) -> Result<Vec<u8>, ApiError> {
    match body {
        Ok(body) => Ok(body),
        Err(e) if !status.is_success() => {
            tracing::debug!(%status, "dropping unreadable error body: {}", e);
            Ok(Vec::new())
        }
        Err(e) => Err(ApiError::Connection(format!(
            "Failed to read response body: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_body_passes_bytes_through() {
        let body = read_body::<String>(StatusCode::OK, Ok(b"{}".to_vec())).unwrap();
        assert_eq!(body, b"{}");
    }

    #[test]
    fn test_unreadable_error_body_keeps_status() {
        let body = read_body(StatusCode::BAD_GATEWAY, Err("connection reset")).unwrap();
        assert!(body.is_empty());

        let response = WireResponse::new(StatusCode::BAD_GATEWAY, body);
        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_unreadable_success_body_is_connection_error() {
        let err = read_body(StatusCode::OK, Err("connection reset")).unwrap_err();
        assert!(matches!(err, ApiError::Connection(msg) if msg.contains("connection reset")));
    }
}
