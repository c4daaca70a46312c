//! Cluster topology model and parser

use std::fmt;

use tracing::debug;

use crate::utils::ProtocolError;

/// One cache-serving endpoint reported by the cluster.
///
/// Immutable once constructed; the connection address is always derived from
/// `ip` and `port`, never stored separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Logical hostname reported by the cluster.
    pub host: String,
    /// Resolved IP literal reported by the cluster.
    pub ip: String,
    /// TCP port.
    pub port: u16,
}

impl Node {
    /// Connection address for the underlying cache client.
    ///
    /// Deliberately `ip:port`, not `host:port`: the cluster reports both, and
    /// clients are wired by IP.
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.host, self.address())
    }
}

/// Ordered set of cache nodes, in the order reported by the configuration
/// endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    /// Nodes in wire order.
    pub nodes: Vec<Node>,
}

impl Topology {
    /// Parse the node-list payload of a discovery response.
    ///
    /// The payload is a sequence of `host|ip|port` records separated by
    /// single spaces. An empty payload is a legitimate empty topology. Any
    /// malformed record fails the whole parse; no partial topology is ever
    /// returned.
    pub fn from_config_payload(raw: &str) -> Result<Self, ProtocolError> {
        if raw.is_empty() {
            return Ok(Self::default());
        }

        let mut nodes = Vec::new();
        for record in raw.split(' ') {
            nodes.push(parse_node_record(record)?);
        }

        debug!(nodes = nodes.len(), "parsed cluster topology");
        Ok(Self { nodes })
    }

    /// Connection addresses (`ip:port`) in node order.
    pub fn addresses(&self) -> Vec<String> {
        self.nodes.iter().map(Node::address).collect()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the topology holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Parse a single `host|ip|port` record.
fn parse_node_record(record: &str) -> Result<Node, ProtocolError> {
    let fields: Vec<&str> = record.split('|').collect();
    if fields.len() != 3 || fields[0].is_empty() || fields[1].is_empty() {
        return Err(ProtocolError::MalformedRecord {
            record: record.to_string(),
        });
    }

    let port: u16 = fields[2].parse().map_err(|_| ProtocolError::InvalidPort {
        record: record.to_string(),
    })?;
    if port == 0 {
        return Err(ProtocolError::InvalidPort {
            record: record.to_string(),
        });
    }

    Ok(Node {
        host: fields[0].to_string(),
        ip: fields[1].to_string(),
        port,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_record() {
        let topology = Topology::from_config_payload("myhost|10.0.0.5|11211").unwrap();

        assert_eq!(topology.len(), 1);
        let node = &topology.nodes[0];
        assert_eq!(node.host, "myhost");
        assert_eq!(node.ip, "10.0.0.5");
        assert_eq!(node.port, 11211);
        assert_eq!(node.address(), "10.0.0.5:11211");
    }

    #[test]
    fn preserves_record_count_and_order() {
        let payload = "a|10.0.0.1|11211 b|10.0.0.2|11212 c|10.0.0.3|11213";
        let topology = Topology::from_config_payload(payload).unwrap();

        assert_eq!(topology.len(), 3);
        let hosts: Vec<&str> = topology.nodes.iter().map(|n| n.host.as_str()).collect();
        assert_eq!(hosts, vec!["a", "b", "c"]);
        assert_eq!(
            topology.addresses(),
            vec!["10.0.0.1:11211", "10.0.0.2:11212", "10.0.0.3:11213"]
        );
    }

    #[test]
    fn empty_payload_is_empty_topology() {
        let topology = Topology::from_config_payload("").unwrap();
        assert!(topology.is_empty());
    }

    #[test]
    fn non_integer_port_fails_whole_parse() {
        let err = Topology::from_config_payload("myhost|10.0.0.5|notaport").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidPort { .. }));
    }

    #[test]
    fn wrong_field_count_fails_whole_parse() {
        let err = Topology::from_config_payload("onlytwo|fields").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedRecord { .. }));
    }

    #[test]
    fn bad_record_discards_earlier_good_ones() {
        let payload = "good|10.0.0.1|11211 bad|fields";
        assert!(Topology::from_config_payload(payload).is_err());
    }

    #[test]
    fn port_zero_is_rejected() {
        let err = Topology::from_config_payload("myhost|10.0.0.5|0").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidPort { .. }));
    }

    #[test]
    fn empty_host_or_ip_is_rejected() {
        assert!(Topology::from_config_payload("|10.0.0.5|11211").is_err());
        assert!(Topology::from_config_payload("myhost||11211").is_err());
    }
}
