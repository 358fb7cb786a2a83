#![forbid(unsafe_code)]
//! linkchain node: serves the ledger over HTTP

use clap::Parser;
use linkchain::config::DEFAULT_CONFIG_PATH;
use linkchain::node::{init_tracing, Node};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "linkchain-node", version, about = "Run a linkchain ledger node")]
struct Args {
    /// Port for the HTTP API (overrides network.api_port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to the TOML config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing();

    let mut node = Node::init(&args.config)?;
    if let Some(port) = args.port {
        node.config.network.api_port = port;
    }

    node.start().await
}
