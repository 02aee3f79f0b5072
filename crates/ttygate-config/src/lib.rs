//! ttygate configuration system.
//!
//! Provides TOML-based configuration with full validation. All config
//! sections use sensible defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ttygate_config::{load_config, config_to_json};
//!
//! let config = load_config(None).expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

// Re-export core types for convenience
pub use schema::{GatewayConfig, CONFIG_SCHEMA_VERSION};

use std::path::Path;
use ttygate_common::ConfigError;

/// Load and validate the gateway config.
///
/// With an explicit `path` the file must exist. Without one, `config.toml`
/// is read from the OS config directory and a commented default is created
/// if none exists.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            toml_loader::load_from_path(path)?
        }
        None => toml_loader::load_default()?,
    };

    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &GatewayConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_to_json_contains_all_sections() {
        let config = GatewayConfig::default();
        let json = config_to_json(&config);
        assert!(json.contains("\"server\""));
        assert!(json.contains("\"auth\""));
        assert!(json.contains("\"app\""));
        assert!(json.contains("\"environment\""));
        assert!(json.contains("\"session\""));
        assert!(json.contains("\"logging\""));
    }

    #[test]
    fn config_schema_version_is_1() {
        assert_eq!(CONFIG_SCHEMA_VERSION, 1);
    }

    #[test]
    fn load_config_with_missing_explicit_path() {
        let result = load_config(Some(Path::new("/tmp/nonexistent_ttygate_config.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn load_config_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[session]\nresize_debounce_ms = 0\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("session.resize_debounce_ms"));
    }

    #[test]
    fn default_config_round_trips_through_json() {
        let config = GatewayConfig::default();
        let json = config_to_json(&config);
        let parsed: GatewayConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.server.port, 2222);
        assert_eq!(parsed.app.default_term, "xterm-256color");
    }
}
