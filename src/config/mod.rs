//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `PHOTO_SEARCH` (nested keys separated by
//! `__`, e.g. `PHOTO_SEARCH__API__API_KEY`).

mod file_config;

pub use file_config::{read_config_file, write_config_file, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::client::{ApiCredentials, ApiError, ReqwestSession};
use crate::controller::{ControllerSettings, DEFAULT_PER_PAGE};
use crate::sources::PEXELS_API_BASE;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "PHOTO_SEARCH";

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "photo-search.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// API endpoint and credentials
    #[serde(default)]
    pub api: ApiConfig,

    /// Search behaviour
    #[serde(default)]
    pub search: SearchConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Copy of this configuration with credentials masked
    pub fn redacted(&self) -> Self {
        let mask = |value: &Option<String>| value.as_ref().map(|_| "<redacted>".to_string());
        let mut config = self.clone();
        config.api.api_key = mask(&self.api.api_key);
        config.api.bearer_token = mask(&self.api.bearer_token);
        config
    }
}

/// API endpoint and credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL the search path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key, sent verbatim in the `Authorization` header
    #[serde(default = "default_api_key")]
    pub api_key: Option<String>,

    /// Bearer token, used when no API key is set
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            bearer_token: None,
        }
    }
}

impl ApiConfig {
    /// Parsed base URL
    pub fn endpoint(&self) -> Result<Url, ApiError> {
        Url::parse(&self.base_url).map_err(|e| {
            ApiError::Configuration(format!("Invalid base URL {}: {}", self.base_url, e))
        })
    }

    /// Credential to attach to requests; the API key wins over the bearer token
    pub fn credentials(&self) -> Option<ApiCredentials> {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

        non_empty(&self.api_key)
            .map(ApiCredentials::ApiKey)
            .or_else(|| non_empty(&self.bearer_token).map(ApiCredentials::Bearer))
    }
}

fn default_base_url() -> String {
    PEXELS_API_BASE.to_string()
}

fn default_api_key() -> Option<String> {
    std::env::var("PEXELS_API_KEY").ok()
}

/// Search behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Photos requested per page
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Quiet period in milliseconds before a changed query is searched
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl SearchConfig {
    /// Controller settings for this configuration
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings::default()
            .per_page(self.per_page)
            .debounce(Duration::from_millis(self.debounce_ms))
    }
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

fn default_debounce_ms() -> u64 {
    500
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    /// Build the HTTP session described by this configuration
    pub fn build_session(&self) -> Result<ReqwestSession, ApiError> {
        ReqwestSession::with_settings(
            &self.user_agent,
            Duration::from_secs(self.timeout_secs),
            Duration::from_secs(self.connect_timeout_secs),
        )
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load configuration from an optional file plus environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let settings = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    settings.try_deserialize()
}

/// Find a configuration file in the usual places
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("photo-search").join("config.toml"))
        .filter(|path| path.is_file())
}
