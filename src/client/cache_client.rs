//! Auto-discovering cache client facade
//!
//! Ties the discovery pipeline to the memcached client: resolve the
//! configuration endpoint, fetch and parse the topology, and wire the
//! underlying client to the discovered addresses.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::discovery::{endpoint, protocol, Topology};
use crate::utils::{ElastiCacheError, Result};

use super::connection::{Item, McClient};
use super::key_lister::ClusterKeyLister;

/// Outcome of the most recent discovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    /// Discovery succeeded; the client is wired to the reported nodes.
    Configured,
    /// Discovery failed; the client has zero nodes.
    Unconfigured,
}

struct Inner {
    topology: Topology,
    mc: McClient,
    state: DiscoveryState,
}

impl Inner {
    fn configured(topology: Topology, config: &ClientConfig) -> Self {
        let mc = McClient::new(
            topology.addresses(),
            config.connect_timeout,
            config.read_timeout,
        );
        Self {
            topology,
            mc,
            state: DiscoveryState::Configured,
        }
    }

    fn unconfigured(config: &ClientConfig) -> Self {
        Self {
            topology: Topology::default(),
            mc: McClient::new(Vec::new(), config.connect_timeout, config.read_timeout),
            state: DiscoveryState::Unconfigured,
        }
    }
}

/// Auto-discovering cache client.
///
/// Construction runs the discovery pipeline once. On failure the constructor
/// still hands back a usable zero-node client next to the error, so the
/// construct-then-check calling pattern never dereferences a missing object;
/// [`CacheClient::state`] reports which outcome happened. Operations on an
/// unconfigured client fail with "no cache nodes configured".
pub struct CacheClient {
    config: ClientConfig,
    inner: RwLock<Inner>,
}

impl CacheClient {
    /// Client configured from the default `ELASTICACHE_ENDPOINT` variable.
    pub fn new() -> (Self, Option<ElastiCacheError>) {
        Self::with_config(ClientConfig::default())
    }

    /// Client owning its own configuration.
    ///
    /// Distinct clients in one process can consult distinct endpoint
    /// variables; nothing is shared between instances.
    pub fn with_config(config: ClientConfig) -> (Self, Option<ElastiCacheError>) {
        let (inner, err) = match discover(&config) {
            Ok(topology) => {
                info!(nodes = topology.len(), "cluster discovery complete");
                (Inner::configured(topology, &config), None)
            }
            Err(err) => {
                warn!(error = %err, "cluster discovery failed; client is unconfigured");
                (Inner::unconfigured(&config), Some(err))
            }
        };

        (
            Self {
                config,
                inner: RwLock::new(inner),
            },
            err,
        )
    }

    /// Discovery outcome of the most recent pipeline run.
    pub fn state(&self) -> DiscoveryState {
        self.read_inner().state
    }

    /// Nodes from the most recent successful discovery, in wire order.
    pub fn topology(&self) -> Topology {
        self.read_inner().topology.clone()
    }

    /// Store `item` on the node owning its key.
    ///
    /// Field-for-field pass-through to the underlying client; the value is
    /// forwarded untransformed.
    pub fn set(&self, item: &Item) -> Result<()> {
        // Clone the client out so a concurrent refresh cannot swap the
        // address list mid-operation.
        let mc = self.read_inner().mc.clone();
        mc.set(item)
    }

    /// List every key stored across the discovered nodes.
    pub fn list_all_keys(&self) -> Result<Vec<String>> {
        let lister = {
            let inner = self.read_inner();
            ClusterKeyLister::new(
                inner.topology.addresses(),
                self.config.connect_timeout,
                self.config.read_timeout,
            )
        };
        lister.list_all_keys()
    }

    /// Re-run the discovery pipeline and atomically swap in the new topology
    /// and underlying client.
    ///
    /// On failure the existing topology stays in place and the error is
    /// returned. Returns the new node count on success. There is no periodic
    /// refresh; callers trigger this explicitly.
    pub fn refresh_topology(&self) -> Result<usize> {
        let topology = discover(&self.config)?;
        let nodes = topology.len();

        *self.write_inner() = Inner::configured(topology, &self.config);
        info!(nodes, "cluster topology refreshed");
        Ok(nodes)
    }

    fn read_inner(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_inner(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resolve endpoint, fetch the node-list line, parse it.
///
/// Every stage error is surfaced upward unchanged.
fn discover(config: &ClientConfig) -> Result<Topology> {
    let endpoint = endpoint::resolve_endpoint(&config.endpoint_var)?;
    let line = protocol::fetch_topology_line(&endpoint, config)?;
    let topology = Topology::from_config_payload(&line)?;
    Ok(topology)
}
