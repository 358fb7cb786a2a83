use crate::transaction::Transaction;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const GENESIS_INDEX: u64 = 1;
pub const GENESIS_PROOF: u64 = 100;
/// Sentinel standing in for the digest of the block before genesis.
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// A hash-linked unit of the ledger.
///
/// The field order below is the canonical serialization order used by
/// [`Block::digest`], and also the wire shape exchanged with peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    /// Build a block stamped with the current time, truncated to the
    /// precision the wire format carries.
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: impl Into<String>,
    ) -> Self {
        Block {
            index,
            timestamp: now(),
            transactions,
            proof,
            previous_hash: previous_hash.into(),
        }
    }

    pub fn genesis() -> Self {
        Block::new(GENESIS_INDEX, Vec::new(), GENESIS_PROOF, GENESIS_PREVIOUS_HASH)
    }

    /// True when index, proof and predecessor sentinel match the genesis
    /// definition. The timestamp is local to each node and not compared.
    pub fn is_genesis(&self) -> bool {
        self.index == GENESIS_INDEX
            && self.proof == GENESIS_PROOF
            && self.previous_hash == GENESIS_PREVIOUS_HASH
    }

    /// Canonical byte form fed to the hasher: compact JSON in field order.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        // Plain strings, integers and a preformatted timestamp into a Vec.
        serde_json::to_vec(self).expect("block serialization is infallible")
    }

    /// Lowercase hex SHA-256 of the canonical serialization.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_bytes());
        hex::encode(hasher.finalize())
    }
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(timestamp_format::SUBSEC_DIGITS)
}

/// Fixed-precision RFC 3339 text form of block timestamps, e.g.
/// `2024-01-01T00:00:00.000000Z`.
pub mod timestamp_format {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const SUBSEC_DIGITS: u16 = 6;

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(ts))
    }

    /// Accepts only text that formats back byte for byte, so a received
    /// block always hashes and re-serves exactly as its producer sent it.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let ts = DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)?;
        if format(&ts) != raw {
            return Err(serde::de::Error::custom(format!(
                "non-canonical timestamp {:?}, expected {:?}",
                raw,
                format(&ts)
            )));
        }
        Ok(ts)
    }
}
