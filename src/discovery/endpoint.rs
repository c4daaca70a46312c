//! Configuration endpoint resolution
//!
//! The cluster publishes a single stable configuration endpoint; its address
//! reaches the process out-of-band through an environment variable.

use std::env;

use tracing::warn;

use crate::config::DEFAULT_ENDPOINT_VAR;
use crate::utils::ConfigError;

/// Look up the configuration endpoint address ("host:port").
///
/// `var` names the environment variable to consult; an empty name falls back
/// to [`DEFAULT_ENDPOINT_VAR`]. An unset or empty variable fails with
/// [`ConfigError::EndpointNotSet`]. Pure lookup, no network side effects.
pub fn resolve_endpoint(var: &str) -> Result<String, ConfigError> {
    let var = if var.is_empty() { DEFAULT_ENDPOINT_VAR } else { var };

    match env::var(var) {
        Ok(endpoint) if !endpoint.is_empty() => Ok(endpoint),
        _ => {
            warn!("cache endpoint not set ({var} is unset or empty)");
            Err(ConfigError::EndpointNotSet {
                var: var.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_configured_endpoint() {
        env::set_var("RESOLVE_TEST_ENDPOINT", "cfg.example.com:11211");
        let endpoint = resolve_endpoint("RESOLVE_TEST_ENDPOINT").unwrap();
        assert_eq!(endpoint, "cfg.example.com:11211");
        env::remove_var("RESOLVE_TEST_ENDPOINT");
    }

    #[test]
    fn missing_variable_is_a_config_error() {
        let err = resolve_endpoint("RESOLVE_TEST_UNSET").unwrap_err();
        assert!(matches!(err, ConfigError::EndpointNotSet { .. }));
    }

    #[test]
    fn empty_value_is_a_config_error() {
        env::set_var("RESOLVE_TEST_EMPTY", "");
        assert!(resolve_endpoint("RESOLVE_TEST_EMPTY").is_err());
        env::remove_var("RESOLVE_TEST_EMPTY");
    }

    #[test]
    fn empty_name_falls_back_to_default_variable() {
        env::remove_var(DEFAULT_ENDPOINT_VAR);
        let ConfigError::EndpointNotSet { var } = resolve_endpoint("").unwrap_err();
        assert_eq!(var, DEFAULT_ENDPOINT_VAR);
    }
}
