//! elasticache — client-side auto-discovery for ElastiCache memcached
//! clusters.
//!
//! Instead of hard-coding node addresses, callers point the client at the
//! cluster's configuration endpoint (through the `ELASTICACHE_ENDPOINT`
//! environment variable, or a per-client override) and the client discovers
//! the node list itself: it resolves the endpoint, issues
//! `config get cluster` over plain TCP, parses the reported `host|ip|port`
//! records, and wires a memcached client to the resulting addresses.
//!
//! ```no_run
//! use elasticache::{CacheClient, Item};
//!
//! let (client, err) = CacheClient::new();
//! if let Some(err) = err {
//!     eprintln!("discovery failed: {err}");
//! }
//!
//! client.set(&Item {
//!     key: "greeting".into(),
//!     value: b"hello".to_vec(),
//!     ..Item::default()
//! })?;
//! # Ok::<(), elasticache::ElastiCacheError>(())
//! ```

pub mod client;
pub mod config;
pub mod discovery;
pub mod utils;

pub use client::{CacheClient, ClusterKeyLister, DiscoveryState, Item};
pub use config::{ClientConfig, DEFAULT_ENDPOINT_VAR};
pub use discovery::{Node, Topology};
pub use utils::{ConfigError, ElastiCacheError, NetworkError, ProtocolError, Result};
