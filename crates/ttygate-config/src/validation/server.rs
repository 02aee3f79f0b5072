//! Validation for the listener, session, and hosted app sections.

use crate::schema::GatewayConfig;

use super::helpers::validate_range;

/// Validate listener constraints.
pub(crate) fn validate_server(errors: &mut Vec<String>, config: &GatewayConfig) {
    validate_range(errors, "server.port", config.server.port.into(), 1, 65535);
    validate_range(
        errors,
        "server.max_sessions",
        config.server.max_sessions,
        1,
        10_000,
    );
    if config.server.host.trim().is_empty() {
        errors.push("server.host must not be empty".into());
    }
    if config.server.host_key_path.trim().is_empty() {
        errors.push("server.host_key_path must not be empty".into());
    }
}

/// Validate session constraints.
pub(crate) fn validate_session(errors: &mut Vec<String>, config: &GatewayConfig) {
    validate_range(
        errors,
        "session.resize_debounce_ms",
        config.session.resize_debounce_ms,
        1,
        5_000,
    );
}

/// Validate hosted app constraints.
pub(crate) fn validate_app(errors: &mut Vec<String>, config: &GatewayConfig) {
    if config.app.default_term.trim().is_empty() {
        errors.push("app.default_term must not be empty".into());
    }
}
