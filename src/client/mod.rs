//! Generic typed request/response client.
//!
//! [`ApiClient`] turns a declarative [`Request`] into a [`WireRequest`], hands it
//! to an [`ApiSession`], validates the status code and decodes the body into
//! `R::Response`. Failures are classified into [`ApiError`]:
//!
//! - no response at all → [`ApiError::Connection`]
//! - status outside `200..300` → [`ApiError::Server`]
//! - malformed success body → [`ApiError::Decode`]
//! - unsupported content type or missing credentials → [`ApiError::Configuration`]
//!
//! A zero-byte success body is decoded as JSON `null`, so [`NoResponse`] endpoints
//! succeed while structured responses report a decode failure.
//!
//! The client keeps no mutable state: no retries, no caching.
//!
//! ```rust,no_run
//! use photo_search::client::{ApiClient, ApiCredentials, ReqwestSession};
//! use photo_search::sources::SearchPhotosRequest;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(
//!     Arc::new(ReqwestSession::new()?),
//!     url::Url::parse("https://api.pexels.com/")?,
//!     Some(ApiCredentials::ApiKey("my-key".into())),
//! );
//! let response = client
//!     .request(&SearchPhotosRequest::new("nature").page(1).per_page(20))
//!     .await?;
//! println!("{} results", response.total_results);
//! # Ok(())
//! # }
//! ```

mod error;
mod request;
mod session;

pub use error::ApiError;
pub use request::{ApiCredentials, ContentType, HttpMethod, NoResponse, Parameters, Request};
pub use session::{ApiSession, ReqwestSession, WireRequest, WireResponse};

use http::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::HeaderMap;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

/// Executes typed requests against one API base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    session: Arc<dyn ApiSession>,
    base_url: Url,
    credentials: Option<ApiCredentials>,
}

impl ApiClient {
    /// Create a new client
    pub fn new(
        session: Arc<dyn ApiSession>,
        base_url: Url,
        credentials: Option<ApiCredentials>,
    ) -> Self {
        Self {
            session,
            base_url,
            credentials,
        }
    }

    /// Build the wire request for a request description
    pub fn build_request<R: Request>(&self, request: &R) -> Result<WireRequest, ApiError> {
        let content_type = request.content_type();
        content_type.ensure_supported()?;

        let method = request.method();
        let mut url = endpoint_url(&self.base_url, request.path())?;
        let mut body = None;

        if method.is_read() {
            let query = request.query();
            if !query.is_empty() {
                let mut pairs = url.query_pairs_mut();
                for (name, value) in &query {
                    pairs.append_pair(name, value);
                }
            }
        } else if method.is_write() {
            if let Some(parameters) = request.parameters() {
                let encoded = serde_json::to_vec(&serde_json::Value::Object(parameters))
                    .map_err(|e| {
                        ApiError::Configuration(format!("Failed to encode request body: {}", e))
                    })?;
                body = Some(encoded);
            }
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if method.is_write() {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static(content_type.header_value()),
            );
        }
        if request.requires_auth() {
            let credentials = self.credentials.as_ref().ok_or_else(|| {
                ApiError::Configuration("No API credentials configured".to_string())
            })?;
            let value = HeaderValue::from_str(&credentials.header_value()).map_err(|_| {
                ApiError::Configuration("API credential is not a valid header value".to_string())
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(WireRequest {
            method: method.as_http(),
            url,
            headers,
            body,
        })
    }

    /// Execute a request and decode its response
    pub async fn request<R: Request>(&self, request: &R) -> Result<R::Response, ApiError> {
        let wire = self.build_request(request).map_err(|e| {
            tracing::error!("Refusing to send request to {}: {}", request.path(), e);
            e
        })?;

        tracing::debug!(method = %wire.method, url = %wire.url, "sending API request");

        let response = self.session.send(wire).await.map_err(|e| {
            tracing::warn!("API request to {} failed: {}", request.path(), e);
            e
        })?;

        if !response.status.is_success() {
            tracing::warn!(
                "API request to {} returned status: {}",
                request.path(),
                response.status
            );
            return Err(ApiError::Server(response.status));
        }

        decode_body(&response.body)
    }
}

/// Append `path` to the base URL as a path component
fn endpoint_url(base: &Url, path: &str) -> Result<Url, ApiError> {
    if base.cannot_be_a_base() {
        return Err(ApiError::Configuration(format!(
            "Base URL cannot carry a path: {}",
            base
        )));
    }

    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }

    base.join(path.trim_start_matches('/'))
        .map_err(|e| ApiError::Configuration(format!("Invalid endpoint path {}: {}", path, e)))
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    if body.is_empty() {
        return serde_json::from_slice(b"null").map_err(ApiError::Decode);
    }
    serde_json::from_slice(body).map_err(ApiError::Decode)
}
