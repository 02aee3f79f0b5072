//! Config path resolution and default file creation.

use std::path::{Path, PathBuf};
use tracing::info;
use ttygate_common::ConfigError;

use super::template::default_config_toml;

const APP_DIR: &str = "ttygate";
const CONFIG_FILE: &str = "config.toml";

/// `<base>/ttygate/config.toml`.
pub fn config_path_in(base: &Path) -> PathBuf {
    base.join(APP_DIR).join(CONFIG_FILE)
}

/// Get the platform-specific default config file path.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| config_path_in(&dir))
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))
}

/// Write the commented default config to `path`, creating parent directories.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    let io_err = |what: &str, target: &Path, e: std::io::Error| {
        ConfigError::ParseError(format!("failed to {what} {}: {e}", target.display()))
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err("create config directory", parent, e))?;
    }
    std::fs::write(path, default_config_toml())
        .map_err(|e| io_err("write default config to", path, e))?;

    info!("created default config at {}", path.display());
    Ok(())
}
