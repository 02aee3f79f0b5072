//! Shared validation helpers used by all domain validators.

use regex::Regex;
use std::sync::LazyLock;

/// POSIX-portable environment variable name.
static ENV_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex pattern must compile")
});

/// Lowercase hex SHA-256 digest.
static SHA256_HEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{64}$").expect("static regex pattern must compile")
});

/// Push an error if `value` is outside `[min, max]` (integer).
pub(crate) fn validate_range(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

/// Push an error if `value` is not a usable environment variable name.
pub(crate) fn validate_env_name(errors: &mut Vec<String>, name: &str, value: &str) {
    if !ENV_NAME_RE.is_match(value) {
        errors.push(format!("{name} contains invalid variable name {value:?}"));
    }
}

pub(crate) fn is_sha256_hex(value: &str) -> bool {
    SHA256_HEX_RE.is_match(value)
}
