//! Utility modules

pub mod error;
pub mod net;

pub use error::{ConfigError, ElastiCacheError, NetworkError, ProtocolError, Result};
