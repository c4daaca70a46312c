//! Discovery wire protocol client
//!
//! Speaks the line-oriented text protocol of the configuration endpoint:
//! send `config get cluster`, scan the response through the `END` sentinel,
//! and pull the node-list line out of it.

use std::io::{BufRead, BufReader, Write};

use tracing::debug;

use crate::config::ClientConfig;
use crate::utils::{net, ElastiCacheError, NetworkError, ProtocolError};

/// Discovery command understood by the configuration endpoint.
const DISCOVERY_COMMAND: &[u8] = b"config get cluster\r\n";

/// Response line carrying the node list (1-indexed).
///
/// Fixed by protocol convention: lines 1 and 2 are metadata. The response
/// carries no line-count field, so an upstream change to the metadata line
/// count would silently break this constant.
const CLUSTER_PAYLOAD_LINE: usize = 3;

/// Sentinel terminating a discovery response.
const END_SENTINEL: &str = "END";

/// Query the configuration endpoint and return the raw node-list line.
///
/// Connect failures surface as [`NetworkError`] and are not retried here;
/// read failures surface as [`ProtocolError`]. A response with no payload
/// line yields an empty string, which callers treat as "no nodes". The
/// connection is closed on every exit path.
pub fn fetch_topology_line(
    endpoint: &str,
    config: &ClientConfig,
) -> Result<String, ElastiCacheError> {
    let mut stream = net::connect(endpoint, config.connect_timeout, config.read_timeout)
        .map_err(|source| NetworkError::ConnectFailed {
            addr: endpoint.to_string(),
            source,
        })?;
    debug!(endpoint, "connected to configuration endpoint");

    stream
        .write_all(DISCOVERY_COMMAND)
        .map_err(ProtocolError::Io)?;

    let line = read_topology_line(BufReader::new(stream))?;
    debug!(payload = %line, "cluster nodes reported");
    Ok(line)
}

/// Scan a discovery response and return the payload line.
///
/// Consumes lines through the `END` sentinel (inclusive) or to end of
/// stream. A response shorter than the payload line yields an empty string
/// rather than an error.
pub fn read_topology_line<R: BufRead>(reader: R) -> Result<String, ProtocolError> {
    let mut payload = String::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if idx + 1 == CLUSTER_PAYLOAD_LINE {
            payload = line.clone();
        }
        if line == END_SENTINEL {
            break;
        }
    }

    Ok(payload)
}
