//! linkchain - a minimal proof-of-work ledger with longest-valid-chain consensus
//!
//! # Architecture
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the canonical hasher, ledger state and chain validation
//! - [`transaction`] - Pending value-transfer records
//! - [`ledger`] - The shared, lock-protected ledger service
//!
//! ## Consensus & Mining
//! - [`miner`] - Proof-of-work puzzle
//! - [`sync`] - Peer fetching and the longest-valid-chain rule
//!
//! ## Integration
//! - [`api`] - HTTP endpoints
//! - [`node`] - Startup wiring
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod ledger;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod miner;
pub mod sync;

// ============================================================================
// Integration
// ============================================================================
#[cfg(feature = "api")]
pub mod api;
pub mod node;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;

pub use blockchain::{Block, ChainSnapshot};
pub use error::{LedgerError, Result};
pub use ledger::Ledger;
pub use sync::{HttpPeerFetch, PeerFetch, ResolvePolicy};
pub use transaction::Transaction;
