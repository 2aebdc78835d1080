//! Peer-to-peer chain replication
//!
//! This module keeps each node's chain eventually consistent with its
//! peers over a line-framed, single-shot TCP protocol. Blocks are only
//! broadcast after local commit; convergence relies on the
//! longest-valid-chain adoption rule.

pub mod node;
pub mod server;

pub use node::{Peer, Peers};
pub use server::{encode_chain_update, process_frame, P2pNetwork, CHAIN_UPDATE};
