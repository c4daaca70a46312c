//! Per-client configuration

use std::time::Duration;

/// Environment variable consulted when no override is configured.
pub const DEFAULT_ENDPOINT_VAR: &str = "ELASTICACHE_ENDPOINT";

/// Per-instance client configuration.
///
/// Every `CacheClient` owns its own copy, so two clients in one process can
/// point at different configuration endpoints without sharing any state.
/// Set once at construction, read-only afterward.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Environment variable holding the configuration endpoint ("host:port").
    pub endpoint_var: String,
    /// TCP connect timeout for the discovery and cache-node connections.
    pub connect_timeout: Duration,
    /// Socket read/write timeout for the discovery and cache-node connections.
    pub read_timeout: Duration,
}

impl ClientConfig {
    /// Configuration reading the endpoint from `var`.
    ///
    /// An empty name selects the default `ELASTICACHE_ENDPOINT`.
    pub fn with_endpoint_var(var: &str) -> Self {
        let mut config = Self::default();
        if !var.is_empty() {
            config.endpoint_var = var.to_string();
        }
        config
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_var: DEFAULT_ENDPOINT_VAR.to_string(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_standard_variable() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint_var, DEFAULT_ENDPOINT_VAR);
    }

    #[test]
    fn empty_override_keeps_default_variable() {
        let config = ClientConfig::with_endpoint_var("");
        assert_eq!(config.endpoint_var, DEFAULT_ENDPOINT_VAR);
    }

    #[test]
    fn override_replaces_variable_name() {
        let config = ClientConfig::with_endpoint_var("SESSIONS_ENDPOINT");
        assert_eq!(config.endpoint_var, "SESSIONS_ENDPOINT");
    }
}
