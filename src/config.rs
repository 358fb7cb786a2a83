//! Configuration management for linkchain

use crate::error::{LedgerError, Result};
use crate::sync::{ResolvePolicy, DEFAULT_FETCH_TIMEOUT};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub consensus: ConsensusConfig,
    #[serde(default)]
    pub miner: MinerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Peer addresses registered at startup, e.g. `http://10.0.0.2:5000`.
    #[serde(default)]
    pub bootstrap_peers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsensusConfig {
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_abort_on_peer_failure")]
    pub abort_on_peer_failure: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MinerConfig {
    /// Fixed reward recipient; a random identifier is generated when unset.
    #[serde(default)]
    pub node_identifier: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            bootstrap_peers: Vec::new(),
        }
    }
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout_secs(),
            abort_on_peer_failure: default_abort_on_peer_failure(),
        }
    }
}

impl ConsensusConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn policy(&self) -> ResolvePolicy {
        ResolvePolicy {
            abort_on_peer_failure: self.abort_on_peer_failure,
        }
    }
}

fn default_api_port() -> u16 {
    5000
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT.as_secs()
}

fn default_abort_on_peer_failure() -> bool {
    true
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: Config = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.consensus.fetch_timeout_secs == 0 {
            return Err(LedgerError::Config(
                "consensus.fetch_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if let Some(id) = &self.miner.node_identifier {
            if id.trim().is_empty() {
                return Err(LedgerError::Config(
                    "miner.node_identifier must not be blank".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Load the config at `path`, falling back to defaults when the file is absent.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    match fs::read_to_string(path.as_ref()) {
        Ok(source) => Config::from_toml(&source),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(e.into()),
    }
}
