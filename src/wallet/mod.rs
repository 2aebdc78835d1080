//! Key management for signing blocks and transactions
//!
//! The ledger core treats signatures as opaque hex strings it stores and
//! forwards; this module produces and verifies them.

#[allow(clippy::module_inception)]
pub mod wallet;

pub use wallet::{verify_signature, Wallet};
