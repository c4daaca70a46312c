//! elasticache-discover - run the cluster discovery pipeline once and print
//! the nodes it finds.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use elasticache::discovery::{self, Topology};
use elasticache::{ClientConfig, DEFAULT_ENDPOINT_VAR};

/// Query an ElastiCache configuration endpoint and print the cluster nodes
#[derive(Parser, Debug)]
#[command(name = "elasticache-discover")]
#[command(version, about)]
struct CliArgs {
    /// Environment variable holding the configuration endpoint
    #[arg(long = "env-var", default_value = DEFAULT_ENDPOINT_VAR)]
    env_var: String,

    /// TCP connect timeout in milliseconds
    #[arg(long = "connect-timeout-ms", default_value_t = 5000)]
    connect_timeout_ms: u64,

    /// Socket read timeout in milliseconds
    #[arg(long = "read-timeout-ms", default_value_t = 10000)]
    read_timeout_ms: u64,

    /// Verbose output (debug level)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn run() -> Result<()> {
    let args = CliArgs::parse();
    setup_logging(args.verbose, args.quiet);

    let config = ClientConfig {
        endpoint_var: args.env_var,
        connect_timeout: Duration::from_millis(args.connect_timeout_ms),
        read_timeout: Duration::from_millis(args.read_timeout_ms),
    };

    let endpoint = discovery::resolve_endpoint(&config.endpoint_var)?;
    println!("configuration endpoint: {endpoint}");

    let line = discovery::fetch_topology_line(&endpoint, &config)?;
    let topology = Topology::from_config_payload(&line)?;

    if topology.is_empty() {
        println!("no nodes reported");
        return Ok(());
    }

    println!("{} node(s):", topology.len());
    for node in &topology.nodes {
        println!("  {:<24} {:<16} {}", node.host, node.ip, node.port);
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
