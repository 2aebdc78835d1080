//! Error handling for the ledger
//!
//! This module provides the typed error taxonomy for all ledger operations.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Typed error conditions for ledger operations
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// Block linkage or index mismatch; the candidate is discarded
    ChainIntegrity(String),
    /// Insufficient validator approvals; drained transactions are restored
    QuorumNotReached { approvals: usize, required: usize },
    /// Voting cannot proceed with an empty validator registry
    NoValidators,
    /// Network communication errors
    Network(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// Cryptographic operation errors
    Crypto(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::ChainIntegrity(msg) => write!(f, "Chain integrity error: {msg}"),
            LedgerError::QuorumNotReached {
                approvals,
                required,
            } => {
                write!(
                    f,
                    "Quorum not reached: {approvals} approvals, {required} required"
                )
            }
            LedgerError::NoValidators => write!(f, "No validators registered"),
            LedgerError::Network(msg) => write!(f, "Network error: {msg}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            LedgerError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}
