//! Memcached ASCII-protocol connection and client
//!
//! Discovery only finds node addresses; talking to the nodes happens here.
//! Connections are plain TCP split into buffered reader/writer halves, opened
//! per operation.

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::time::Duration;

use tracing::debug;

use crate::utils::{net, NetworkError, ProtocolError, Result};

/// A value to store in the cluster.
#[derive(Debug, Clone, Default)]
pub struct Item {
    /// Cache key. Memcached limits keys to 250 bytes with no whitespace.
    pub key: String,
    /// Opaque value bytes.
    pub value: Vec<u8>,
    /// Client-opaque flags stored alongside the value.
    pub flags: u32,
    /// Expiration in seconds; 0 means never expire.
    pub expiration: u32,
}

/// One open connection to a cache node.
#[derive(Debug)]
pub struct McConnection {
    writer: BufWriter<TcpStream>,
    reader: BufReader<TcpStream>,
}

impl McConnection {
    /// Connect to `addr` ("ip:port").
    pub fn connect(
        addr: &str,
        connect_timeout: Duration,
        io_timeout: Duration,
    ) -> Result<Self, NetworkError> {
        let connect_failed = |source| NetworkError::ConnectFailed {
            addr: addr.to_string(),
            source,
        };

        let stream = net::connect(addr, connect_timeout, io_timeout).map_err(connect_failed)?;
        let writer = BufWriter::new(stream.try_clone().map_err(connect_failed)?);
        let reader = BufReader::new(stream);

        Ok(Self { writer, reader })
    }

    /// Store `item`, replacing any existing value under its key.
    pub fn set(&mut self, item: &Item) -> Result<(), ProtocolError> {
        write!(
            self.writer,
            "set {} {} {} {}\r\n",
            item.key,
            item.flags,
            item.expiration,
            item.value.len()
        )?;
        self.writer.write_all(&item.value)?;
        self.writer.write_all(b"\r\n")?;
        self.writer.flush()?;

        let reply = self.read_line()?;
        if reply == "STORED" {
            return Ok(());
        }
        if is_error_reply(&reply) {
            return Err(ProtocolError::ServerError(reply));
        }
        Err(ProtocolError::UnexpectedResponse {
            expected: "STORED".to_string(),
            actual: reply,
        })
    }

    /// Issue a `stats` subcommand and collect the reply lines up to `END`
    /// (exclusive).
    pub fn stats(&mut self, args: &str) -> Result<Vec<String>, ProtocolError> {
        if args.is_empty() {
            self.writer.write_all(b"stats\r\n")?;
        } else {
            write!(self.writer, "stats {args}\r\n")?;
        }
        self.writer.flush()?;

        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            if line == "END" {
                return Ok(lines);
            }
            if is_error_reply(&line) {
                return Err(ProtocolError::ServerError(line));
            }
            lines.push(line);
        }
    }

    /// Read one reply line, stripped of its CRLF terminator.
    fn read_line(&mut self) -> Result<String, ProtocolError> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line)?;
        if n == 0 {
            return Err(ProtocolError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed",
            )));
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }
}

fn is_error_reply(line: &str) -> bool {
    line == "ERROR" || line.starts_with("CLIENT_ERROR") || line.starts_with("SERVER_ERROR")
}

/// Minimal memcached client over a discovered node list.
///
/// Node selection hashes the key with CRC16/XMODEM across the configured
/// addresses, so a given key always lands on the same node for a given
/// topology.
#[derive(Clone)]
pub struct McClient {
    addresses: Vec<String>,
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl McClient {
    /// Client over `addresses` (`ip:port` strings, wire order).
    pub fn new(addresses: Vec<String>, connect_timeout: Duration, io_timeout: Duration) -> Self {
        Self {
            addresses,
            connect_timeout,
            io_timeout,
        }
    }

    /// Addresses this client was configured with.
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    /// Store `item` on the node owning its key.
    pub fn set(&self, item: &Item) -> Result<()> {
        let addr = self.pick_node(item.key.as_bytes())?;
        debug!(addr, key = %item.key, "set");

        let mut conn = McConnection::connect(addr, self.connect_timeout, self.io_timeout)?;
        conn.set(item)?;
        Ok(())
    }

    /// Pick the node owning `key`.
    fn pick_node(&self, key: &[u8]) -> Result<&str, NetworkError> {
        if self.addresses.is_empty() {
            return Err(NetworkError::NoServers);
        }
        let idx = crc16(key) as usize % self.addresses.len();
        Ok(&self.addresses[idx])
    }
}

/// CRC16/XMODEM, used to hash keys onto nodes.
fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    fn timeouts() -> (Duration, Duration) {
        (Duration::from_secs(2), Duration::from_secs(2))
    }

    /// Accept one connection, run `handler` over its reader/writer halves.
    fn spawn_node<F>(handler: F) -> String
    where
        F: FnOnce(&mut BufReader<TcpStream>, &mut TcpStream) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr").to_string();

        thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone"));
            let mut writer = stream;
            handler(&mut reader, &mut writer);
        });

        addr
    }

    #[test]
    fn crc16_known_vector() {
        // XMODEM test vector: "123456789" -> 0x31C3
        assert_eq!(crc16(b"123456789"), 0x31C3);
    }

    #[test]
    fn key_routing_is_deterministic() {
        let client = McClient::new(
            vec!["10.0.0.1:11211".into(), "10.0.0.2:11211".into()],
            Duration::from_secs(1),
            Duration::from_secs(1),
        );
        let first = client.pick_node(b"session:42").unwrap().to_string();
        let second = client.pick_node(b"session:42").unwrap().to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn set_with_no_servers_fails() {
        let client = McClient::new(Vec::new(), Duration::from_secs(1), Duration::from_secs(1));
        let err = client
            .set(&Item {
                key: "k".into(),
                value: b"v".to_vec(),
                ..Item::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            crate::utils::ElastiCacheError::Network(NetworkError::NoServers)
        ));
    }

    #[test]
    fn set_writes_ascii_command_and_accepts_stored() {
        let addr = spawn_node(|reader, writer| {
            let mut command = String::new();
            reader.read_line(&mut command).expect("read command");
            assert_eq!(command, "set greeting 7 60 5\r\n");

            let mut data = vec![0u8; 7];
            io::Read::read_exact(reader, &mut data).expect("read data");
            assert_eq!(&data, b"hello\r\n");

            writer.write_all(b"STORED\r\n").expect("write reply");
        });

        let (connect_timeout, io_timeout) = timeouts();
        let mut conn = McConnection::connect(&addr, connect_timeout, io_timeout).unwrap();
        conn.set(&Item {
            key: "greeting".into(),
            value: b"hello".to_vec(),
            flags: 7,
            expiration: 60,
        })
        .unwrap();
    }

    #[test]
    fn set_surfaces_server_error_reply() {
        let addr = spawn_node(|reader, writer| {
            let mut command = String::new();
            reader.read_line(&mut command).expect("read command");
            let mut data = vec![0u8; 3];
            io::Read::read_exact(reader, &mut data).expect("read data");
            writer
                .write_all(b"SERVER_ERROR out of memory\r\n")
                .expect("write reply");
        });

        let (connect_timeout, io_timeout) = timeouts();
        let mut conn = McConnection::connect(&addr, connect_timeout, io_timeout).unwrap();
        let err = conn
            .set(&Item {
                key: "k".into(),
                value: b"v".to_vec(),
                ..Item::default()
            })
            .unwrap_err();
        assert!(matches!(err, ProtocolError::ServerError(_)));
    }

    #[test]
    fn stats_collects_lines_until_end() {
        let addr = spawn_node(|reader, writer| {
            let mut command = String::new();
            reader.read_line(&mut command).expect("read command");
            assert_eq!(command, "stats items\r\n");
            writer
                .write_all(b"STAT items:1:number 2\r\nSTAT items:1:age 100\r\nEND\r\n")
                .expect("write reply");
        });

        let (connect_timeout, io_timeout) = timeouts();
        let mut conn = McConnection::connect(&addr, connect_timeout, io_timeout).unwrap();
        let lines = conn.stats("items").unwrap();
        assert_eq!(
            lines,
            vec!["STAT items:1:number 2", "STAT items:1:age 100"]
        );
    }

    #[test]
    fn connect_to_closed_port_is_a_network_error() {
        // Bind then immediately drop to get a port with no listener.
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("local addr").to_string()
        };

        let (connect_timeout, io_timeout) = timeouts();
        let err = McConnection::connect(&addr, connect_timeout, io_timeout).unwrap_err();
        assert!(matches!(err, NetworkError::ConnectFailed { .. }));
    }
}
