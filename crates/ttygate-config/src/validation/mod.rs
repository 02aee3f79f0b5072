//! Full configuration validation.
//!
//! Validates numeric ranges, environment variable names, and credential
//! formats. Each domain has its own submodule; this orchestrator calls them
//! all and collects errors into a single `ConfigError`.

mod auth;
mod environment;
mod helpers;
mod server;

#[cfg(test)]
mod tests;

use crate::schema::GatewayConfig;
use ttygate_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &GatewayConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    server::validate_server(&mut errors, config);
    server::validate_session(&mut errors, config);
    server::validate_app(&mut errors, config);
    auth::validate_auth(&mut errors, config);
    environment::validate_environment(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
