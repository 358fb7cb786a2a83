//! Chain synchronization for linkchain
//!
//! This module provides the longest-valid-chain rule:
//! - The [`PeerFetch`] collaborator that retrieves a peer's chain
//! - [`HttpPeerFetch`], the production fetcher over HTTP
//! - Candidate vetting and the resolution pass itself
//! - Peer address parsing for the node registry

use crate::blockchain::{has_contiguous_indices, is_valid, Block, ChainSnapshot};
use crate::error::{LedgerError, Result};
use crate::ledger::Ledger;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Default bound on a single peer fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Retrieves the full chain state of a peer.
pub trait PeerFetch: Send + Sync {
    fn fetch_chain(&self, host: &str) -> impl Future<Output = Result<ChainSnapshot>> + Send;
}

/// Fetches `GET http://{host}/chain` and decodes `{length, chain}`.
#[derive(Debug, Clone)]
pub struct HttpPeerFetch {
    client: reqwest::Client,
}

impl HttpPeerFetch {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl PeerFetch for HttpPeerFetch {
    async fn fetch_chain(&self, host: &str) -> Result<ChainSnapshot> {
        let url = format!("http://{}/chain", host);
        debug!(url = %url, "Fetching peer chain");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LedgerError::PeerUnreachable {
                host: host.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(LedgerError::MalformedPeerResponse {
                host: host.to_string(),
                reason: format!("status {}", response.status()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LedgerError::PeerUnreachable {
                host: host.to_string(),
                reason: format!("Failed to read response body: {}", e),
            })?;

        serde_json::from_slice(&bytes).map_err(|e| LedgerError::MalformedPeerResponse {
            host: host.to_string(),
            reason: e.to_string(),
        })
    }
}

/// How a resolution pass reacts to a peer that cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvePolicy {
    /// Stop the whole pass and report no replacement (the default), or
    /// skip the failing peer and keep scanning.
    pub abort_on_peer_failure: bool,
}

impl Default for ResolvePolicy {
    fn default() -> Self {
        Self {
            abort_on_peer_failure: true,
        }
    }
}

/// A chain that beat the local one.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub host: String,
    pub chain: Vec<Block>,
}

/// Accept `snapshot` if it is longer than `best_length` and fully valid.
///
/// `Ok(None)` means not longer; `Err(InvalidChain)` means longer but
/// disqualified.
pub fn vet_candidate(
    host: &str,
    snapshot: ChainSnapshot,
    best_length: usize,
) -> Result<Option<Vec<Block>>> {
    if snapshot.length <= best_length {
        return Ok(None);
    }

    let invalid = |reason: &str| LedgerError::InvalidChain {
        host: host.to_string(),
        reason: reason.to_string(),
    };

    if snapshot.chain.len() != snapshot.length {
        return Err(invalid(&format!(
            "reported length {} but sent {} blocks",
            snapshot.length,
            snapshot.chain.len()
        )));
    }
    if !snapshot.chain.first().is_some_and(Block::is_genesis) {
        return Err(invalid("first block is not a genesis block"));
    }
    if !has_contiguous_indices(&snapshot.chain) {
        return Err(invalid("block indices are not contiguous"));
    }
    if !is_valid(&snapshot.chain) {
        return Err(invalid("hash linkage or proof check failed"));
    }

    Ok(Some(snapshot.chain))
}

/// Scan `hosts` for the longest valid chain longer than `local_length`.
pub async fn find_longest_chain<F: PeerFetch>(
    fetch: &F,
    hosts: &[String],
    local_length: usize,
    policy: ResolvePolicy,
) -> Result<Option<Candidate>> {
    let mut best: Option<Candidate> = None;
    let mut best_length = local_length;

    for host in hosts {
        let snapshot = match fetch.fetch_chain(host).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_fetch_failure() && policy.abort_on_peer_failure => return Err(e),
            Err(e) => {
                warn!(host = %host, error = %e, "Skipping peer");
                continue;
            }
        };

        match vet_candidate(host, snapshot, best_length) {
            Ok(Some(chain)) => {
                debug!(host = %host, length = chain.len(), "New best candidate chain");
                best_length = chain.len();
                best = Some(Candidate {
                    host: host.clone(),
                    chain,
                });
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Discarding candidate chain"),
        }
    }

    Ok(best)
}

/// Run one resolution pass against every registered peer and swap in the
/// winner, if any. Fetches happen outside the ledger lock.
pub async fn resolve<F: PeerFetch>(ledger: &Ledger, fetch: &F) -> Result<bool> {
    let hosts = ledger.nodes();
    let local_length = ledger.chain_len();

    let Some(candidate) =
        find_longest_chain(fetch, &hosts, local_length, ledger.policy()).await?
    else {
        return Ok(false);
    };

    let length = candidate.chain.len();
    let replaced = ledger.replace_chain(candidate.chain);
    if replaced {
        info!(host = %candidate.host, length, "Local chain replaced by peer chain");
    }
    Ok(replaced)
}

/// Extract `host[:port]` from a peer address such as `http://10.0.0.2:5000`.
///
/// Peers are always fetched over plain `http`, so for any other scheme the
/// scheme's default port is kept explicitly (`https://x` becomes `x:443`).
pub fn parse_peer_host(address: &str) -> Result<String> {
    let url = Url::parse(address)
        .map_err(|e| LedgerError::InvalidPeerAddress(format!("{}: {}", address, e)))?;

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => {
            return Err(LedgerError::InvalidPeerAddress(format!(
                "{}: missing host",
                address
            )))
        }
    };

    let port = match url.scheme() {
        "http" => url.port(),
        _ => url.port_or_known_default(),
    };

    Ok(match port {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(chain: Vec<Block>) -> ChainSnapshot {
        ChainSnapshot::new(chain)
    }

    #[test]
    fn test_parse_peer_host() {
        assert_eq!(parse_peer_host("http://192.168.0.5:5000").unwrap(), "192.168.0.5:5000");
        assert_eq!(parse_peer_host("http://example.com/chain").unwrap(), "example.com");
        assert_eq!(parse_peer_host("https://[::1]:8080").unwrap(), "[::1]:8080");
    }

    #[test]
    fn test_parse_peer_host_keeps_non_http_ports() {
        assert_eq!(parse_peer_host("https://peer.example:443").unwrap(), "peer.example:443");
        assert_eq!(parse_peer_host("https://peer.example").unwrap(), "peer.example:443");
        assert_eq!(parse_peer_host("http://peer.example:80").unwrap(), "peer.example");
    }

    #[test]
    fn test_parse_peer_host_rejects_hostless() {
        assert!(parse_peer_host("not a url").is_err());
        assert!(parse_peer_host("localhost:5000").is_err());
        assert!(parse_peer_host("").is_err());
    }

    #[test]
    fn test_vet_ignores_shorter_chain() {
        let result = vet_candidate("peer", snapshot(vec![Block::genesis()]), 2).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_vet_rejects_length_mismatch() {
        let mut snap = snapshot(vec![Block::genesis()]);
        snap.length = 5;
        let err = vet_candidate("peer", snap, 1).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidChain { .. }));
    }

    #[test]
    fn test_vet_rejects_missing_genesis() {
        let mut block = Block::genesis();
        block.proof = 99;
        let err = vet_candidate("peer", snapshot(vec![block]), 0).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidChain { .. }));
    }

    #[test]
    fn test_vet_rejects_broken_links() {
        let forged = Block::new(2, Vec::new(), 0, "not-a-digest");
        let err = vet_candidate("peer", snapshot(vec![Block::genesis(), forged]), 1).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidChain { .. }));
    }
}
