//! Declarative request descriptions.
//!
//! A [`Request`] says *what* to send (method, path, query parameters, body
//! parameters, content type, whether it needs credentials) and which type the
//! response decodes into. The [`ApiClient`](super::ApiClient) turns it into a
//! wire request.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::ApiError;

/// JSON body parameters for write requests
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// HTTP method of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Methods whose parameters travel in the URL query
    pub fn is_read(&self) -> bool {
        matches!(self, HttpMethod::Get)
    }

    /// Methods whose parameters travel in a JSON body
    pub fn is_write(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    /// Convert to the wire method
    pub fn as_http(&self) -> http::Method {
        match self {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Patch => http::Method::PATCH,
        }
    }
}

/// Declared content type of a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentType {
    None,
    FormUrlEncoded,
    #[default]
    Json,
}

impl ContentType {
    /// Header value for this content type
    pub fn header_value(&self) -> &'static str {
        match self {
            ContentType::None => "",
            ContentType::FormUrlEncoded => "application/x-www-form-urlencoded; charset=utf-8",
            ContentType::Json => "application/json",
        }
    }

    /// Only JSON requests are supported; anything else is a configuration mistake
    pub fn ensure_supported(&self) -> Result<(), ApiError> {
        match self {
            ContentType::Json => Ok(()),
            other => Err(ApiError::Configuration(format!(
                "Unsupported content type: {:?}",
                other
            ))),
        }
    }
}

/// Credential attached to authenticated requests
#[derive(Clone, PartialEq, Eq)]
pub enum ApiCredentials {
    /// Sent verbatim in the `Authorization` header
    ApiKey(String),
    /// Sent as `Authorization: Bearer <token>`
    Bearer(String),
}

impl ApiCredentials {
    /// Value of the `Authorization` header
    pub fn header_value(&self) -> String {
        match self {
            ApiCredentials::ApiKey(key) => key.clone(),
            ApiCredentials::Bearer(token) => format!("Bearer {}", token),
        }
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiCredentials::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            ApiCredentials::Bearer(_) => f.write_str("Bearer(<redacted>)"),
        }
    }
}

/// An API request description.
///
/// Only `Response`, `method` and `path` are required; everything else has a
/// sensible default (no query, no body, JSON, authenticated).
pub trait Request: Send + Sync {
    /// Type the success body decodes into
    type Response: DeserializeOwned + Send;

    /// HTTP method
    fn method(&self) -> HttpMethod;

    /// Endpoint path, appended to the base URL
    fn path(&self) -> &str;

    /// Query parameters, in order (read methods only)
    fn query(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Body parameters (write methods only)
    fn parameters(&self) -> Option<Parameters> {
        None
    }

    /// Declared content type
    fn content_type(&self) -> ContentType {
        ContentType::Json
    }

    /// Whether the request needs the configured credential
    fn requires_auth(&self) -> bool {
        true
    }
}

/// Response type for endpoints that answer with no content.
///
/// An empty body decodes as JSON `null`, which a unit struct accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoResponse;
