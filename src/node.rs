use crate::config::{load_config, Config};
use crate::ledger::Ledger;
use crate::sync::HttpPeerFetch;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Startup wiring: one ledger, one peer fetcher, one reward identifier,
/// built once and shared with the API.
pub struct Node {
    pub config: Config,
    pub ledger: Arc<Ledger>,
    pub fetch: Arc<HttpPeerFetch>,
    pub node_identifier: String,
}

/// Random identifier in the dashless UUID form, e.g. `3f2a...9c`.
pub fn generate_node_identifier() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Install the global `tracing` subscriber, honouring `RUST_LOG`.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

impl Node {
    /// Load config from `config_path` and build the node from it.
    pub fn init(config_path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = load_config(config_path)?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let node_identifier = config
            .miner
            .node_identifier
            .clone()
            .unwrap_or_else(generate_node_identifier);

        let ledger = Arc::new(Ledger::with_policy(config.consensus.policy()));
        let fetch = Arc::new(HttpPeerFetch::new(config.consensus.fetch_timeout())?);

        for peer in &config.network.bootstrap_peers {
            if let Err(e) = ledger.register_node(peer) {
                warn!(peer = %peer, error = %e, "Ignoring bootstrap peer");
            }
        }

        info!(
            node_identifier = %node_identifier,
            peers = ledger.nodes().len(),
            "Node initialised"
        );

        Ok(Self {
            config,
            ledger,
            fetch,
            node_identifier,
        })
    }

    #[cfg(feature = "api")]
    pub async fn start(self) -> Result<(), Box<dyn std::error::Error>> {
        let port = self.config.network.api_port;
        let api_node = Arc::new(crate::api::Node::new(
            self.ledger.clone(),
            self.fetch.clone(),
            self.node_identifier.clone(),
        ));
        crate::api::run_api_server(api_node, port).await
    }
}
