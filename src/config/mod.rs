//! Configuration module

pub mod client_config;

pub use client_config::{ClientConfig, DEFAULT_ENDPOINT_VAR};
