//! Core TOML config loading: read from path or platform default.

use crate::schema::GatewayConfig;
use std::path::Path;
use tracing::info;
use ttygate_common::ConfigError;

use super::paths::{create_default_config, default_config_path};

/// Load config from a specific TOML file path.
///
/// Deserializes the file using serde defaults for any missing fields.
/// Validation is left to the caller.
pub fn load_from_path(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: GatewayConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform-specific default path.
///
/// On macOS: `~/Library/Application Support/ttygate/config.toml`
/// On Linux: `~/.config/ttygate/config.toml`
///
/// If the file does not exist, creates a default config file and returns defaults.
pub fn load_default() -> Result<GatewayConfig, ConfigError> {
    let path = default_config_path()?;

    if !path.exists() {
        info!("no config found at {}, creating default", path.display());
        create_default_config(&path)?;
        return Ok(GatewayConfig::default());
    }

    load_from_path(&path)
}
