use crate::consensus::{PodConsensus, TxAdmission};
use crate::core::{Block, ChainStore, Transaction};
use crate::error::Result;
use crate::network::P2pNetwork;
use crate::storage::{AddOutcome, MemoryPool};
use crate::wallet::Wallet;
use log::{info, warn};
use std::sync::{Arc, Mutex};

/// Result of a mining cycle that did not fail.
#[derive(Debug, Clone)]
pub enum MiningOutcome {
    Mined(Block),
    NothingToMine,
}

/// Result of submitting an uploaded transaction to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    DuplicatePending,
    DuplicateCommitted,
}

/// Thin glue binding mempool, consensus, chain, and network: drains the
/// pool, assembles a candidate, puts it to the vote, commits on approval,
/// restores on rejection, and triggers the broadcast.
pub struct MiningCoordinator {
    chain: Arc<ChainStore>,
    mempool: Arc<MemoryPool>,
    consensus: Arc<PodConsensus>,
    wallet: Wallet,
    network: Option<Arc<P2pNetwork>>,
    // At most one mining cycle in flight per node; two concurrent drains
    // would split one logical transaction set across two candidates.
    mining_lock: Mutex<()>,
}

impl MiningCoordinator {
    pub fn new(
        chain: Arc<ChainStore>,
        mempool: Arc<MemoryPool>,
        consensus: Arc<PodConsensus>,
        wallet: Wallet,
        network: Option<Arc<P2pNetwork>>,
    ) -> MiningCoordinator {
        MiningCoordinator {
            chain,
            mempool,
            consensus,
            wallet,
            network,
            mining_lock: Mutex::new(()),
        }
    }

    /// Entry point for upload handlers: admit the transaction against the
    /// committed chain (stamping validator endorsements), then queue it.
    pub fn submit(&self, mut tx: Transaction) -> SubmitOutcome {
        match self.consensus.admit_transaction(&mut tx, &self.chain) {
            TxAdmission::DuplicateContent => SubmitOutcome::DuplicateCommitted,
            TxAdmission::Admitted => match self.mempool.add(tx) {
                AddOutcome::Added => SubmitOutcome::Accepted,
                AddOutcome::Duplicate => SubmitOutcome::DuplicatePending,
            },
        }
    }

    /// Run one mining cycle. Serialized against other cycles on this
    /// node; a rejected cycle restores every drained transaction.
    pub fn mine(&self) -> Result<MiningOutcome> {
        let _cycle = self
            .mining_lock
            .lock()
            .expect("Failed to acquire mining lock - this should never happen");

        let txs = self.mempool.drain();
        if txs.is_empty() {
            info!("No transactions in mempool to mine");
            return Ok(MiningOutcome::NothingToMine);
        }

        let head = self.chain.head();
        let candidate = match Block::new_block(
            head.get_index() + 1,
            txs.clone(),
            head.get_hash().to_string(),
            &self.wallet,
        ) {
            Ok(block) => block,
            Err(e) => {
                self.mempool.restore(txs);
                return Err(e);
            }
        };

        match self.consensus.validate_block(&candidate) {
            Ok(approval) => {
                if let Err(e) = self.chain.append(candidate.clone(), approval.attestations) {
                    // The head moved under us (e.g. a peer sync landed);
                    // the candidate is stale, the transactions are not.
                    warn!("Discarding stale candidate: {e}");
                    self.mempool.restore(txs);
                    return Err(e);
                }

                info!(
                    "Block #{} committed with {} approvals",
                    candidate.get_index(),
                    approval.approvers.len()
                );
                if let Some(network) = &self.network {
                    network.broadcast();
                }
                Ok(MiningOutcome::Mined(candidate))
            }
            Err(e) => {
                warn!("Mining cycle rejected: {e}");
                self.mempool.restore(txs);
                Err(e)
            }
        }
    }
}
