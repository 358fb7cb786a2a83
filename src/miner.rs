//! Proof-of-work puzzle
//!
//! A proof is valid when `sha256(hex(last_proof) ++ hex(proof) ++ last_hash)`
//! starts with [`DIFFICULTY_PREFIX`]. The search walks upward from zero, so
//! the returned proof is always the smallest one for its inputs.

use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};

/// Fixed difficulty: four leading zero hex digits.
pub const DIFFICULTY_PREFIX: &str = "0000";

/// How many candidates to try between looks at the cancellation flag.
const CANCEL_CHECK_INTERVAL: u64 = 4096;

pub fn valid_proof(last_proof: u64, proof: u64, last_hash: &str) -> bool {
    let guess = format!("{:x}{:x}{}", last_proof, proof, last_hash);
    let digest = hex::encode(Sha256::digest(guess.as_bytes()));
    digest.starts_with(DIFFICULTY_PREFIX)
}

/// Find the smallest proof linking onto `(last_proof, last_hash)`.
///
/// Unbounded and CPU-bound. Call it without holding any ledger lock.
pub fn proof_of_work(last_proof: u64, last_hash: &str) -> u64 {
    let mut proof = 0u64;
    while !valid_proof(last_proof, proof, last_hash) {
        proof += 1;
    }
    proof
}

/// Like [`proof_of_work`], but gives up and returns `None` once `cancel`
/// is raised by the caller.
pub fn proof_of_work_until(last_proof: u64, last_hash: &str, cancel: &AtomicBool) -> Option<u64> {
    let mut proof = 0u64;
    loop {
        if proof % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
            return None;
        }
        if valid_proof(last_proof, proof, last_hash) {
            return Some(proof);
        }
        proof += 1;
    }
}
