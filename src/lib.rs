//! # pod-ledger
//!
//! A replicated, append-only ledger of data-upload attestations with a
//! validator-quorum ("Proof-of-Data") consensus mechanism in place of
//! proof-of-work. Each node keeps its state in memory and converges with
//! peers through best-effort gossip and longest-valid-chain adoption.
//!
//! ## Layout
//! - `core/`: transactions, blocks, the chain store, and the mining
//!   coordinator that binds a cycle together
//! - `consensus/`: the validator registry, quorum voting, the injectable
//!   approval policy, and attestation records
//! - `storage/`: the mempool of pending transactions
//! - `network/`: the peer registry and the line-framed replication protocol
//! - `wallet/`: ECDSA key management for sealing blocks and attestations
//! - `config/`: node configuration
//! - `utils/`: digests and the file fingerprint routine
//! - `cli/`: command-line interface for the node binary

pub mod cli;
pub mod config;
pub mod consensus;
pub mod core;
pub mod error;
pub mod network;
pub mod storage;
pub mod utils;
pub mod wallet;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::{Config, GLOBAL_CONFIG};
pub use consensus::{
    ApprovalPolicy, Attestation, BlockApproval, PodConsensus, RegisterOutcome,
    TrustThresholdPolicy, TxAdmission, Validator, APPROVAL_REWARD, DEFAULT_TRUST_THRESHOLD,
};
pub use crate::core::{
    Block, ChainStore, MiningCoordinator, MiningOutcome, SubmitOutcome, Transaction,
    GENESIS_PREVIOUS_HASH,
};
pub use error::{LedgerError, Result};
pub use network::{encode_chain_update, process_frame, P2pNetwork, Peer, Peers, CHAIN_UPDATE};
pub use storage::{AddOutcome, MemoryPool};
pub use utils::{hash_file, sha256_digest, sha256_hex};
pub use wallet::{verify_signature, Wallet};
