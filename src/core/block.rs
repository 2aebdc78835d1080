use crate::core::Transaction;
use crate::error::Result;
use crate::utils::sha256_hex;
use crate::wallet::Wallet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parent-hash sentinel carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Marker hashed in place of transaction ids when a block carries none
/// (only the genesis block does).
const EMPTY_TRANSACTIONS_MARKER: &str = "GENESIS";

/// A committed unit of the ledger. Blocks are immutable once constructed:
/// the hash covers index, timestamp, every transaction id in order, and the
/// parent hash, and the miner's seal is computed over that hash before the
/// block is handed to anyone else. Validator approval lives in separate
/// attestation records, never inside the block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    index: u64,
    timestamp: DateTime<Utc>,
    transactions: Vec<Transaction>,
    previous_hash: String,
    hash: String,
    signature: String,
}

impl Block {
    pub fn new_block(
        index: u64,
        transactions: Vec<Transaction>,
        previous_hash: String,
        wallet: &Wallet,
    ) -> Result<Block> {
        let timestamp = Utc::now();
        let hash = Self::calculate_hash(index, &timestamp, &transactions, &previous_hash);
        let signature = wallet.sign_data(&hash)?;

        Ok(Block {
            index,
            timestamp,
            transactions,
            previous_hash,
            hash,
            signature,
        })
    }

    pub fn generate_genesis_block(wallet: &Wallet) -> Result<Block> {
        Block::new_block(0, vec![], String::from(GENESIS_PREVIOUS_HASH), wallet)
    }

    fn calculate_hash(
        index: u64,
        timestamp: &DateTime<Utc>,
        transactions: &[Transaction],
        previous_hash: &str,
    ) -> String {
        let tx_ids = if transactions.is_empty() {
            String::from(EMPTY_TRANSACTIONS_MARKER)
        } else {
            transactions
                .iter()
                .map(|tx| tx.get_id())
                .collect::<Vec<&str>>()
                .concat()
        };

        let input = format!(
            "{}{}{}{}",
            index,
            timestamp.to_rfc3339(),
            tx_ids,
            previous_hash
        );
        sha256_hex(input.as_bytes())
    }

    /// Recompute the hash from content and compare it to the stored one.
    /// Used when re-validating chains received from peers.
    pub fn verify_hash(&self) -> bool {
        Self::calculate_hash(
            self.index,
            &self.timestamp,
            &self.transactions,
            &self.previous_hash,
        ) == self.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash == GENESIS_PREVIOUS_HASH
    }

    pub fn get_index(&self) -> u64 {
        self.index
    }

    pub fn get_timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn get_previous_hash(&self) -> &str {
        self.previous_hash.as_str()
    }

    pub fn get_hash(&self) -> &str {
        self.hash.as_str()
    }

    pub fn get_signature(&self) -> &str {
        self.signature.as_str()
    }
}
