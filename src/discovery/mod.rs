//! Cluster discovery pipeline
//!
//! This module covers the three discovery stages:
//! - Resolution of the configuration endpoint from the environment
//! - The `config get cluster` wire exchange with that endpoint
//! - Parsing of the reported node list into a topology

pub mod endpoint;
pub mod protocol;
pub mod topology;

pub use endpoint::resolve_endpoint;
pub use protocol::{fetch_topology_line, read_topology_line};
pub use topology::{Node, Topology};
