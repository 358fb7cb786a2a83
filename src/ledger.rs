//! The shared ledger service
//!
//! One [`Ledger`] is built at startup and handed to every caller behind an
//! `Arc`. All mutable state sits behind a single mutex whose critical
//! sections are short and synchronous. The proof-of-work search and peer
//! fetches always run with the lock released.

use crate::blockchain::{Block, ChainSnapshot, LedgerState};
use crate::error::{LedgerError, Result};
use crate::miner::{proof_of_work, proof_of_work_until};
use crate::sync::{self, parse_peer_host, PeerFetch, ResolvePolicy};
use crate::transaction::Transaction;
use parking_lot::Mutex;
use std::sync::atomic::AtomicBool;
use tracing::{debug, info, warn};

pub struct Ledger {
    state: Mutex<LedgerState>,
    policy: ResolvePolicy,
}

impl Ledger {
    /// A fresh ledger holding only the genesis block.
    pub fn new() -> Self {
        Self::with_policy(ResolvePolicy::default())
    }

    pub fn with_policy(policy: ResolvePolicy) -> Self {
        Self {
            state: Mutex::new(LedgerState::new()),
            policy,
        }
    }

    pub fn policy(&self) -> ResolvePolicy {
        self.policy
    }

    /// Queue a transfer; returns the index of the block that will hold it.
    pub fn submit_transaction(
        &self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: u64,
    ) -> u64 {
        let transaction = Transaction::new(sender, recipient, amount);
        let index = self.state.lock().submit(transaction);
        debug!(next_block = index, "Transaction queued");
        index
    }

    /// Solve the puzzle against the current tip and forge a block paying
    /// the reward to `miner`. Retries if the tip moves during the search.
    pub fn mine(&self, miner: &str) -> Block {
        loop {
            if let Some(block) = self.mine_with(miner, |last_proof, last_hash| {
                Some(proof_of_work(last_proof, last_hash))
            }) {
                return block;
            }
        }
    }

    /// Like [`Ledger::mine`], but stops with [`LedgerError::MiningCancelled`]
    /// once `cancel` is raised.
    pub fn mine_until(&self, miner: &str, cancel: &AtomicBool) -> Result<Block> {
        self.mine_with(miner, |last_proof, last_hash| {
            proof_of_work_until(last_proof, last_hash, cancel)
        })
        .ok_or(LedgerError::MiningCancelled)
    }

    fn mine_with<S>(&self, miner: &str, mut solve: S) -> Option<Block>
    where
        S: FnMut(u64, &str) -> Option<u64>,
    {
        loop {
            let (last_proof, last_hash, tip_length) = {
                let state = self.state.lock();
                let last = state.last_block();
                (last.proof, last.digest(), state.chain.len())
            };

            let proof = solve(last_proof, &last_hash)?;

            let mut state = self.state.lock();
            if state.chain.len() != tip_length || state.last_block().digest() != last_hash {
                debug!(
                    expected_length = tip_length,
                    actual_length = state.chain.len(),
                    "Chain tip moved during proof search, retrying"
                );
                continue;
            }

            state.submit(Transaction::reward(miner));
            let block = state.create_block(proof, last_hash);
            let transfers = block.transactions.iter().filter(|tx| !tx.is_reward()).count();
            info!(
                index = block.index,
                proof = block.proof,
                transfers,
                "New block forged"
            );
            return Some(block);
        }
    }

    pub fn get_chain(&self) -> ChainSnapshot {
        self.state.lock().snapshot()
    }

    pub fn chain_len(&self) -> usize {
        self.state.lock().chain.len()
    }

    pub fn last_block(&self) -> Block {
        self.state.lock().last_block().clone()
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.state.lock().pending.clone()
    }

    /// Registered peer hosts, sorted.
    pub fn nodes(&self) -> Vec<String> {
        self.state.lock().nodes.iter().cloned().collect()
    }

    /// Add the host of `address` to the registry. Returns `Ok(false)` when it
    /// was already known and `InvalidPeerAddress` when no host can be found.
    pub fn register_node(&self, address: &str) -> Result<bool> {
        let host = parse_peer_host(address)?;
        let added = self.state.lock().add_node(host.clone());
        if added {
            info!(host = %host, "Registered peer");
        }
        Ok(added)
    }

    /// Longest-valid-chain rule. Any fetch failure collapses into `false`.
    pub async fn resolve_conflicts<F: PeerFetch>(&self, fetch: &F) -> bool {
        match sync::resolve(self, fetch).await {
            Ok(replaced) => replaced,
            Err(e) => {
                warn!(error = %e, "Conflict resolution aborted");
                false
            }
        }
    }

    /// Swap in `chain` if it is still longer than the local one.
    pub(crate) fn replace_chain(&self, chain: Vec<Block>) -> bool {
        let mut state = self.state.lock();
        if chain.len() <= state.chain.len() {
            debug!(
                candidate = chain.len(),
                local = state.chain.len(),
                "Local chain grew past the candidate, keeping it"
            );
            return false;
        }
        state.chain = chain;
        true
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
