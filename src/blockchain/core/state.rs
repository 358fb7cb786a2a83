use crate::blockchain::core::chain::Block;
use crate::transaction::Transaction;
use serde::Serialize;
use std::collections::BTreeSet;

/// Everything the ledger lock protects: the chain, the pending pool and
/// the peer registry.
#[derive(Debug, Clone)]
pub struct LedgerState {
    pub chain: Vec<Block>,
    pub pending: Vec<Transaction>,
    pub nodes: BTreeSet<String>,
}

/// Chain state as exposed to callers and exchanged with peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct ChainSnapshot {
    pub length: usize,
    pub chain: Vec<Block>,
}

impl ChainSnapshot {
    pub fn new(chain: Vec<Block>) -> Self {
        ChainSnapshot {
            length: chain.len(),
            chain,
        }
    }
}

impl LedgerState {
    pub fn new() -> Self {
        LedgerState {
            chain: vec![Block::genesis()],
            pending: Vec::new(),
            nodes: BTreeSet::new(),
        }
    }

    pub fn last_block(&self) -> &Block {
        // The chain always holds at least the genesis block.
        &self.chain[self.chain.len() - 1]
    }

    /// Queue a transaction; returns the index of the block that will hold it.
    pub fn submit(&mut self, transaction: Transaction) -> u64 {
        self.pending.push(transaction);
        self.chain.len() as u64 + 1
    }

    /// Drain the pool into a new block appended at the tip.
    pub fn create_block(&mut self, proof: u64, previous_hash: impl Into<String>) -> Block {
        let transactions = std::mem::take(&mut self.pending);
        let block = Block::new(self.chain.len() as u64 + 1, transactions, proof, previous_hash);
        self.chain.push(block.clone());
        block
    }

    /// Adds `host` unless already present. Returns whether it was new.
    pub fn add_node(&mut self, host: String) -> bool {
        self.nodes.insert(host)
    }

    pub fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot::new(self.chain.clone())
    }
}

impl Default for LedgerState {
    fn default() -> Self {
        Self::new()
    }
}
