//! Tests for the full validation pipeline.

use super::*;
use crate::schema::*;

const DIGEST: &str = "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b";

#[test]
fn default_config_validates() {
    let config = GatewayConfig::default();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_port_zero() {
    let mut config = GatewayConfig::default();
    config.server.port = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.port"));
}

#[test]
fn catches_max_sessions_zero() {
    let mut config = GatewayConfig::default();
    config.server.max_sessions = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.max_sessions"));
}

#[test]
fn catches_debounce_out_of_range() {
    let mut config = GatewayConfig::default();
    config.session.resize_debounce_ms = 10_000;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("session.resize_debounce_ms"));
}

#[test]
fn catches_empty_default_term() {
    let mut config = GatewayConfig::default();
    config.app.default_term = "  ".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("app.default_term"));
}

#[test]
fn credentials_mode_requires_entries() {
    let mut config = GatewayConfig::default();
    config.auth.mode = AuthMode::Credentials;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("auth.mode"));

    config.auth.passwords.insert("alice".into(), DIGEST.into());
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_malformed_digest() {
    let mut config = GatewayConfig::default();
    config.auth.mode = AuthMode::Credentials;
    config.auth.passwords.insert("bob".into(), "hunter2".into());
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("auth.passwords.bob"));
}

#[test]
fn uppercase_digest_is_rejected() {
    let mut config = GatewayConfig::default();
    config
        .auth
        .passwords
        .insert("carol".into(), DIGEST.to_uppercase());
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("auth.passwords.carol"));
}

#[test]
fn catches_invalid_allow_list_name() {
    let mut config = GatewayConfig::default();
    config.environment.allow.push("BAD-NAME".into());
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("environment.allow"));
    assert!(err.contains("BAD-NAME"));
}

#[test]
fn catches_invalid_override_key() {
    let mut config = GatewayConfig::default();
    config
        .environment
        .overrides
        .insert("1ST".into(), "value".into());
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("environment.overrides"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = GatewayConfig::default();
    config.server.port = 0;
    config.session.resize_debounce_ms = 0;
    config.environment.allow.push("has space".into());
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.port"));
    assert!(err.contains("session.resize_debounce_ms"));
    assert!(err.contains("environment.allow"));
    assert_eq!(err.matches("; ").count(), 2);
}
