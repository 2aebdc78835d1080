//! Core ledger functionality
//!
//! This module contains the fundamental ledger components: transactions,
//! blocks, the chain store, and the mining coordinator.

pub mod block;
pub mod chain;
pub mod mining;
pub mod transaction;

pub use block::{Block, GENESIS_PREVIOUS_HASH};
pub use chain::ChainStore;
pub use mining::{MiningCoordinator, MiningOutcome, SubmitOutcome};
pub use transaction::Transaction;
