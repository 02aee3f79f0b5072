use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Host variables a session may inherit when nothing else is configured.
pub const DEFAULT_ENV_ALLOW_LIST: &[&str] =
    &["PATH", "HOME", "LANG", "LC_ALL", "LC_CTYPE", "NODE_ENV"];

/// Which host variables reach spawned sessions.
///
/// Anything not listed in `allow` is never copied from the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub allow: Vec<String>,
    /// Fixed values applied after the allow-list copy.
    pub overrides: BTreeMap<String, String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            allow: DEFAULT_ENV_ALLOW_LIST.iter().map(|s| s.to_string()).collect(),
            overrides: BTreeMap::new(),
        }
    }
}
