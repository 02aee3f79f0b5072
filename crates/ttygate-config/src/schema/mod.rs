//! Configuration schema types for ttygate.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults of the public demo deployment.

mod app;
mod auth;
mod environment;
mod logging;
mod server;
mod session;

pub use app::*;
pub use auth::*;
pub use environment::*;
pub use logging::*;
pub use server::*;
pub use session::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub app: AppConfig,
    pub environment: EnvironmentConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================
