//! Authentication policy configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which policy the listener applies to incoming SSH authentication.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Accept every attempt. Only for public, non-sensitive deployments.
    #[default]
    AcceptAll,
    /// Check passwords and public keys against the lists below.
    Credentials,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub mode: AuthMode,
    /// User name to lowercase hex SHA-256 digest of the password.
    pub passwords: BTreeMap<String, String>,
    /// Public key fingerprints (as printed by the SSH library) allowed to log in.
    pub authorized_keys: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_mode_parses_snake_case() {
        let config: AuthConfig = toml::from_str(r#"mode = "credentials""#).unwrap();
        assert_eq!(config.mode, AuthMode::Credentials);

        let config: AuthConfig = toml::from_str(r#"mode = "accept_all""#).unwrap();
        assert_eq!(config.mode, AuthMode::AcceptAll);
    }

    #[test]
    fn passwords_table() {
        let toml_str = r#"
mode = "credentials"

[passwords]
alice = "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
"#;
        let config: AuthConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.passwords.len(), 1);
        assert!(config.passwords.contains_key("alice"));
        assert!(config.authorized_keys.is_empty());
    }
}
