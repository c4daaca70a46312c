//! Cross-node key enumeration
//!
//! Memcached has no native "list keys" command; the closest thing is walking
//! the populated slab classes with `stats items` and dumping each class with
//! `stats cachedump`. This lister runs that walk on every node of the
//! cluster and merges the results.

use std::collections::HashSet;
use std::time::Duration;

use tracing::debug;

use crate::utils::{NetworkError, Result};

use super::connection::McConnection;

/// Key lister over a fixed set of node addresses.
pub struct ClusterKeyLister {
    addresses: Vec<String>,
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl ClusterKeyLister {
    /// Lister over `addresses` (`ip:port` strings, wire order).
    pub fn new(addresses: Vec<String>, connect_timeout: Duration, io_timeout: Duration) -> Self {
        Self {
            addresses,
            connect_timeout,
            io_timeout,
        }
    }

    /// Keys stored across all nodes.
    ///
    /// De-duplicated, first-seen order; node order follows the address list.
    /// A node that cannot be reached fails the whole listing.
    pub fn list_all_keys(&self) -> Result<Vec<String>> {
        if self.addresses.is_empty() {
            return Err(NetworkError::NoServers.into());
        }

        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for addr in &self.addresses {
            let node_keys = self.list_node_keys(addr)?;
            debug!(addr = %addr, keys = node_keys.len(), "node keys listed");
            for key in node_keys {
                if seen.insert(key.clone()) {
                    keys.push(key);
                }
            }
        }
        Ok(keys)
    }

    /// Enumerate the keys held by a single node.
    fn list_node_keys(&self, addr: &str) -> Result<Vec<String>> {
        let mut conn = McConnection::connect(addr, self.connect_timeout, self.io_timeout)?;

        let mut keys = Vec::new();
        for (slab, count) in parse_slab_counts(&conn.stats("items")?) {
            let dump = conn.stats(&format!("cachedump {slab} {count}"))?;
            for line in &dump {
                if let Some(key) = parse_item_key(line) {
                    keys.push(key.to_string());
                }
            }
        }
        Ok(keys)
    }
}

/// Extract `(slab id, item count)` pairs from `stats items` output.
///
/// Relevant lines look like `STAT items:7:number 1234`; every other
/// `items:<slab>:*` statistic is skipped, as are empty slab classes.
fn parse_slab_counts(lines: &[String]) -> Vec<(u32, u64)> {
    let mut slabs = Vec::new();
    for line in lines {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 3 || parts[0] != "STAT" {
            continue;
        }

        let fields: Vec<&str> = parts[1].split(':').collect();
        if fields.len() != 3 || fields[0] != "items" || fields[2] != "number" {
            continue;
        }

        if let (Ok(slab), Ok(count)) = (fields[1].parse::<u32>(), parts[2].parse::<u64>()) {
            if count > 0 {
                slabs.push((slab, count));
            }
        }
    }
    slabs
}

/// Extract the key from a `stats cachedump` line (`ITEM <key> [<n> b; <t> s]`).
fn parse_item_key(line: &str) -> Option<&str> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() >= 2 && parts[0] == "ITEM" {
        Some(parts[1])
    } else {
        None
    }
}
