//! Shared fixtures for integration tests

#![allow(dead_code)]

use linkchain::{ChainSnapshot, Ledger, LedgerError, PeerFetch, Result};
use parking_lot::Mutex;
use std::collections::HashMap;

/// What a scripted peer answers with.
pub enum Reply {
    Chain(ChainSnapshot),
    Unreachable,
    Malformed,
    /// The peer answered, but the fetcher already disqualified its chain.
    Rejected,
}

/// In-memory stand-in for the HTTP fetcher. Records every host it is asked for.
#[derive(Default)]
pub struct ScriptedFetch {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, host: &str, reply: Reply) -> Self {
        self.replies.insert(host.to_string(), reply);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl PeerFetch for ScriptedFetch {
    async fn fetch_chain(&self, host: &str) -> Result<ChainSnapshot> {
        self.calls.lock().push(host.to_string());
        match self.replies.get(host) {
            Some(Reply::Chain(snapshot)) => Ok(snapshot.clone()),
            Some(Reply::Malformed) => Err(LedgerError::MalformedPeerResponse {
                host: host.to_string(),
                reason: "expected value at line 1 column 1".to_string(),
            }),
            Some(Reply::Rejected) => Err(LedgerError::InvalidChain {
                host: host.to_string(),
                reason: "hash linkage or proof check failed".to_string(),
            }),
            Some(Reply::Unreachable) | None => Err(LedgerError::PeerUnreachable {
                host: host.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

/// A ledger with `blocks` mined blocks on top of genesis.
pub fn ledger_with_blocks(blocks: usize) -> Ledger {
    let ledger = Ledger::new();
    for _ in 0..blocks {
        ledger.mine("peer-miner");
    }
    ledger
}

/// The `/chain` body a peer holding `blocks` mined blocks would serve.
pub fn peer_chain(blocks: usize) -> ChainSnapshot {
    ledger_with_blocks(blocks).get_chain()
}
