//! Error types for linkchain

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Network failure while contacting a peer.
    #[error("peer {host} unreachable: {reason}")]
    PeerUnreachable { host: String, reason: String },

    /// The peer answered, but the body is not a `{length, chain}` document.
    #[error("malformed response from peer {host}: {reason}")]
    MalformedPeerResponse { host: String, reason: String },

    /// A fetched chain failed validation and was disqualified.
    #[error("invalid chain from peer {host}: {reason}")]
    InvalidChain { host: String, reason: String },

    #[error("invalid peer address: {0}")]
    InvalidPeerAddress(String),

    #[error("mining cancelled")]
    MiningCancelled,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// Whether this error stops a resolution pass instead of just
    /// disqualifying one candidate.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            LedgerError::PeerUnreachable { .. } | LedgerError::MalformedPeerResponse { .. }
        )
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, LedgerError>;
