//! Validation for the authentication section.

use crate::schema::{AuthMode, GatewayConfig};

use super::helpers::is_sha256_hex;

/// Validate auth constraints.
///
/// Credential mode needs something to check against, and every password
/// digest must be a lowercase hex SHA-256.
pub(crate) fn validate_auth(errors: &mut Vec<String>, config: &GatewayConfig) {
    let auth = &config.auth;

    if auth.mode == AuthMode::Credentials
        && auth.passwords.is_empty()
        && auth.authorized_keys.is_empty()
    {
        errors.push(
            "auth.mode = \"credentials\" requires auth.passwords or auth.authorized_keys".into(),
        );
    }

    for (user, digest) in &auth.passwords {
        if user.is_empty() {
            errors.push("auth.passwords contains an empty user name".into());
        }
        if !is_sha256_hex(digest) {
            errors.push(format!(
                "auth.passwords.{user} must be a 64-character lowercase hex SHA-256 digest"
            ));
        }
    }

    if auth.authorized_keys.iter().any(|k| k.trim().is_empty()) {
        errors.push("auth.authorized_keys contains an empty fingerprint".into());
    }
}
