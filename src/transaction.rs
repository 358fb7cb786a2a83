//! Pending value-transfer records

use serde::{Deserialize, Serialize};

/// Sender used for the mining reward; no real account ever owns it.
pub const REWARD_SENDER: &str = "0";

/// Amount credited to the miner for each forged block.
pub const MINING_REWARD: u64 = 1;

/// A transfer waiting in the pool or frozen inside a block.
///
/// Field order is part of the hashed wire format; do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: u64) -> Self {
        Transaction {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// The reward paid to `miner` for solving the puzzle.
    pub fn reward(miner: impl Into<String>) -> Self {
        Transaction::new(REWARD_SENDER, miner, MINING_REWARD)
    }

    pub fn is_reward(&self) -> bool {
        self.sender == REWARD_SENDER
    }
}
