//! Validation for the environment allow-list and overrides.

use crate::schema::GatewayConfig;

use super::helpers::validate_env_name;

pub(crate) fn validate_environment(errors: &mut Vec<String>, config: &GatewayConfig) {
    for name in &config.environment.allow {
        validate_env_name(errors, "environment.allow", name);
    }
    for key in config.environment.overrides.keys() {
        validate_env_name(errors, "environment.overrides", key);
    }
}
