//! Cache client layer

pub mod cache_client;
pub mod connection;
pub mod key_lister;

pub use cache_client::{CacheClient, DiscoveryState};
pub use connection::{Item, McClient, McConnection};
pub use key_lister::ClusterKeyLister;
