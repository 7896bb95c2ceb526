//! Configuration file support.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "https://api.pexels.com/"
//! api_key = "your-api-key"
//!
//! [search]
//! per_page = 20
//! debounce_ms = 500
//!
//! [http]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use std::path::Path;

use super::Config;

/// Read a configuration file without applying environment overrides
pub fn read_config_file(path: &Path) -> Result<Config, ConfigFileError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io(e.to_string()))?;
    toml::from_str(&content).map_err(|e| ConfigFileError::Parse(e.to_string()))
}

/// Write `config` as TOML, creating parent directories as needed.
///
/// An existing file is only replaced when `overwrite` is set.
pub fn write_config_file(
    config: &Config,
    path: &Path,
    overwrite: bool,
) -> Result<(), ConfigFileError> {
    if path.exists() && !overwrite {
        return Err(ConfigFileError::AlreadyExists(path.display().to_string()));
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
    }
    std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Config file already exists: {0} (use --force to overwrite)")]
    AlreadyExists(String),
}
