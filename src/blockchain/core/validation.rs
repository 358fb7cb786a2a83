use crate::blockchain::core::chain::Block;
use crate::miner::valid_proof;

/// Check every adjacent pair of `chain` for hash linkage and a valid proof.
///
/// The puzzle is checked against the predecessor's recomputed digest, the
/// same value the miner solved against. Chains of length 0 or 1 are
/// vacuously valid.
pub fn is_valid(chain: &[Block]) -> bool {
    first_invalid_link(chain).is_none()
}

/// Index of the first block whose link to its predecessor is broken.
pub fn first_invalid_link(chain: &[Block]) -> Option<usize> {
    chain.windows(2).enumerate().find_map(|(i, pair)| {
        let (prev, cur) = (&pair[0], &pair[1]);
        let prev_digest = prev.digest();
        if cur.previous_hash != prev_digest || !valid_proof(prev.proof, cur.proof, &prev_digest) {
            Some(i + 1)
        } else {
            None
        }
    })
}

/// Indices must run 1, 2, 3, ... with no gaps.
pub fn has_contiguous_indices(chain: &[Block]) -> bool {
    chain
        .iter()
        .enumerate()
        .all(|(i, block)| block.index == i as u64 + 1)
}
