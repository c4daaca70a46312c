//! TCP connect helper shared by the discovery and cache-node connections.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Open a TCP connection to `addr` ("host:port").
///
/// Resolves the hostname, connects to the first resolved address within
/// `connect_timeout`, and bounds subsequent reads and writes with
/// `io_timeout`.
pub fn connect(
    addr: &str,
    connect_timeout: Duration,
    io_timeout: Duration,
) -> io::Result<TcpStream> {
    let sock_addr = addr
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses found"))?;

    let stream = TcpStream::connect_timeout(&sock_addr, connect_timeout)?;

    stream.set_nodelay(true).ok();
    stream.set_read_timeout(Some(io_timeout)).ok();
    stream.set_write_timeout(Some(io_timeout)).ok();

    Ok(stream)
}
