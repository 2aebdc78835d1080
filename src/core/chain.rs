// The chain store owns the committed block sequence and the attestations
// recorded for each block. All access goes through synchronized methods;
// nothing hands out a reference into the locked state.

use crate::consensus::Attestation;
use crate::core::{Block, GENESIS_PREVIOUS_HASH};
use crate::error::{LedgerError, Result};
use crate::wallet::Wallet;
use log::info;
use std::collections::HashMap;
use std::sync::RwLock;

pub struct ChainStore {
    blocks: RwLock<Vec<Block>>,
    // Keyed by block hash; pruned when a replacement drops the block.
    attestations: RwLock<HashMap<String, Vec<Attestation>>>,
}

impl ChainStore {
    /// Initialize a chain holding a freshly minted, signed genesis block.
    pub fn new() -> Result<ChainStore> {
        let genesis_wallet = Wallet::new()?;
        let genesis = Block::generate_genesis_block(&genesis_wallet)?;
        info!("Created genesis block {}", genesis.get_hash());

        Ok(ChainStore {
            blocks: RwLock::new(vec![genesis]),
            attestations: RwLock::new(HashMap::new()),
        })
    }

    pub fn head(&self) -> Block {
        let blocks = self
            .blocks
            .read()
            .expect("Failed to acquire read lock on chain - this should never happen");
        blocks
            .last()
            .expect("Chain always holds at least the genesis block")
            .clone()
    }

    pub fn all(&self) -> Vec<Block> {
        self.blocks
            .read()
            .expect("Failed to acquire read lock on chain - this should never happen")
            .clone()
    }

    pub fn len(&self) -> usize {
        self.blocks
            .read()
            .expect("Failed to acquire read lock on chain - this should never happen")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any committed transaction already carries this file
    /// fingerprint. Used by transaction admission to reject re-uploads.
    pub fn contains_file_hash(&self, file_hash: &str) -> bool {
        let blocks = self
            .blocks
            .read()
            .expect("Failed to acquire read lock on chain - this should never happen");
        blocks
            .iter()
            .flat_map(|block| block.get_transactions())
            .any(|tx| tx.get_file_hash() == file_hash)
    }

    pub fn attestations_for(&self, block_hash: &str) -> Vec<Attestation> {
        let attestations = self
            .attestations
            .read()
            .expect("Failed to acquire read lock on attestations - this should never happen");
        attestations.get(block_hash).cloned().unwrap_or_default()
    }

    /// Append a quorum-approved candidate. The candidate must extend the
    /// current head exactly; otherwise it is discarded with
    /// `ChainIntegrity` and local state is untouched.
    pub fn append(&self, candidate: Block, attestations: Vec<Attestation>) -> Result<()> {
        let mut blocks = self
            .blocks
            .write()
            .expect("Failed to acquire write lock on chain - this should never happen");
        let head = blocks
            .last()
            .expect("Chain always holds at least the genesis block");

        if candidate.get_previous_hash() != head.get_hash() {
            return Err(LedgerError::ChainIntegrity(format!(
                "Candidate parent {} does not match head {}",
                candidate.get_previous_hash(),
                head.get_hash()
            )));
        }
        if candidate.get_index() != head.get_index() + 1 {
            return Err(LedgerError::ChainIntegrity(format!(
                "Candidate index {} does not follow head index {}",
                candidate.get_index(),
                head.get_index()
            )));
        }

        let mut book = self
            .attestations
            .write()
            .expect("Failed to acquire write lock on attestations - this should never happen");
        book.insert(candidate.get_hash().to_string(), attestations);

        info!(
            "Appended block #{} {} with {} transactions",
            candidate.get_index(),
            candidate.get_hash(),
            candidate.get_transactions().len()
        );
        blocks.push(candidate);
        Ok(())
    }

    /// The sole mutation path used during peer synchronization. Adopts the
    /// candidate chain only if it is strictly longer than the local chain
    /// AND valid end-to-end; anything else leaves local state unchanged.
    ///
    /// Returns whether the candidate was adopted.
    pub fn replace_if_longer(&self, candidate: Vec<Block>) -> Result<bool> {
        let mut blocks = self
            .blocks
            .write()
            .expect("Failed to acquire write lock on chain - this should never happen");

        if candidate.len() <= blocks.len() {
            return Ok(false);
        }
        Self::validate_chain(&candidate)?;

        info!(
            "Adopting peer chain of length {} over local length {}",
            candidate.len(),
            blocks.len()
        );

        // Drop attestations for blocks no longer on the chain.
        let mut book = self
            .attestations
            .write()
            .expect("Failed to acquire write lock on attestations - this should never happen");
        book.retain(|hash, _| candidate.iter().any(|block| block.get_hash() == hash));

        *blocks = candidate;
        Ok(true)
    }

    /// End-to-end structural validation of a full chain: genesis shape,
    /// index continuity, linkage, content hashes, and the commit markers a
    /// quorum-committed block always carries (miner seal, non-empty
    /// transaction set).
    fn validate_chain(blocks: &[Block]) -> Result<()> {
        let genesis = blocks.first().ok_or_else(|| {
            LedgerError::ChainIntegrity("Candidate chain is empty".to_string())
        })?;

        if genesis.get_index() != 0
            || genesis.get_previous_hash() != GENESIS_PREVIOUS_HASH
            || !genesis.get_transactions().is_empty()
        {
            return Err(LedgerError::ChainIntegrity(
                "Candidate chain does not start with a genesis block".to_string(),
            ));
        }
        if !genesis.verify_hash() {
            return Err(LedgerError::ChainIntegrity(
                "Genesis block hash does not match its content".to_string(),
            ));
        }

        for window in blocks.windows(2) {
            let (parent, block) = (&window[0], &window[1]);

            if block.get_index() != parent.get_index() + 1 {
                return Err(LedgerError::ChainIntegrity(format!(
                    "Block index {} does not follow {}",
                    block.get_index(),
                    parent.get_index()
                )));
            }
            if block.get_previous_hash() != parent.get_hash() {
                return Err(LedgerError::ChainIntegrity(format!(
                    "Block #{} is not linked to its parent",
                    block.get_index()
                )));
            }
            if !block.verify_hash() {
                return Err(LedgerError::ChainIntegrity(format!(
                    "Block #{} hash does not match its content",
                    block.get_index()
                )));
            }
            if block.get_transactions().is_empty() || block.get_signature().is_empty() {
                return Err(LedgerError::ChainIntegrity(format!(
                    "Block #{} is missing its commit markers",
                    block.get_index()
                )));
            }
            if block.get_transactions().iter().any(|tx| !tx.verify_id()) {
                return Err(LedgerError::ChainIntegrity(format!(
                    "Block #{} carries a transaction whose id does not match its content",
                    block.get_index()
                )));
            }
        }

        Ok(())
    }
}
