use serde::{Deserialize, Serialize};

/// Listener and host key settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind. `0.0.0.0` listens on all IPv4 interfaces.
    pub host: String,
    /// TCP port for the SSH listener.
    pub port: u16,
    /// Path to the host private key (OpenSSH or PKCS#8).
    pub host_key_path: String,
    /// Generate an ephemeral Ed25519 key when `host_key_path` does not exist.
    pub generate_host_key: bool,
    /// Upper bound on concurrently open shell sessions.
    pub max_sessions: u32,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 2222,
            host_key_path: "host.key".into(),
            generate_host_key: true,
            max_sessions: 64,
        }
    }
}
