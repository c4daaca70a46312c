//! Error types for the elasticache client

use std::io;
use thiserror::Error;

/// Top-level client error
#[derive(Error, Debug)]
pub enum ElastiCacheError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Configuration-source lookup errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cache endpoint not set ({var} is unset or empty)")]
    EndpointNotSet { var: String },
}

/// Transport-level errors
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("failed to connect to {addr}: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("no cache nodes configured")]
    NoServers,
}

/// Discovery and memcached wire protocol errors
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("IO failure mid-exchange: {0}")]
    Io(#[from] io::Error),

    #[error("malformed node record {record:?}: expected host|ip|port")]
    MalformedRecord { record: String },

    #[error("invalid port in node record {record:?}")]
    InvalidPort { record: String },

    #[error("server error: {0}")]
    ServerError(String),

    #[error("unexpected response: expected {expected}, got {actual}")]
    UnexpectedResponse { expected: String, actual: String },
}

pub type Result<T, E = ElastiCacheError> = std::result::Result<T, E>;
