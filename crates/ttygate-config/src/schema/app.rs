//! Hosted application settings.

use serde::{Deserialize, Serialize};

/// The interactive program each session runs inside its PTY.
///
/// The gateway treats it as an opaque byte-stream process; it never looks
/// at what the program draws.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Program path. Empty string means the host's login shell.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
    /// Working directory. `None` means the gateway's own working directory.
    pub working_directory: Option<String>,
    /// Switch the client into the alternate screen for the session.
    pub full_screen: bool,
    /// Terminal type used when the client does not send one.
    pub default_term: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            program: String::new(),
            args: Vec::new(),
            working_directory: None,
            full_screen: true,
            default_term: ttygate_common::DEFAULT_TERM.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_config_defaults() {
        let config = AppConfig::default();
        assert!(config.program.is_empty());
        assert!(config.args.is_empty());
        assert!(config.working_directory.is_none());
        assert!(config.full_screen);
        assert_eq!(config.default_term, "xterm-256color");
    }

    #[test]
    fn app_config_partial_toml() {
        let toml_str = r#"
program = "node"
args = ["app/index.js"]
full_screen = false
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.program, "node");
        assert_eq!(config.args, vec!["app/index.js"]);
        assert!(!config.full_screen);
        // Defaults preserved
        assert!(config.working_directory.is_none());
        assert_eq!(config.default_term, "xterm-256color");
    }

    #[test]
    fn app_config_serialization_roundtrip() {
        let config = AppConfig {
            program: "/usr/local/bin/portfolio".into(),
            args: vec!["--theme".into(), "dark".into()],
            working_directory: Some("/srv/portfolio".into()),
            full_screen: false,
            default_term: "vt100".into(),
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.program, config.program);
        assert_eq!(deserialized.args, config.args);
        assert_eq!(deserialized.working_directory, config.working_directory);
        assert_eq!(deserialized.full_screen, config.full_screen);
        assert_eq!(deserialized.default_term, config.default_term);
    }
}
