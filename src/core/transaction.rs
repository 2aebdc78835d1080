use crate::utils::sha256_hex;
use serde::{Deserialize, Serialize};

/// A data-upload attestation awaiting (or holding) a place in the ledger.
///
/// The identifier is content-addressed: it is derived from the file
/// fingerprint, uploader, size, trust score, and uploader signature, so
/// identical submissions always collide on the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "txID")]
    tx_id: String,
    file_hash: String,
    uploader: String,
    size: u64,
    trust_score: f64,
    validators: Vec<String>,
    signature: String,
}

impl Transaction {
    pub fn new(
        file_hash: String,
        uploader: String,
        size: u64,
        trust_score: f64,
        signature: String,
    ) -> Transaction {
        let mut tx = Transaction {
            tx_id: String::new(),
            file_hash,
            uploader,
            size,
            trust_score,
            validators: vec![],
            signature,
        };
        tx.tx_id = tx.calculate_tx_id();
        tx
    }

    /// Derive the content-addressed identifier. The endorsement list is
    /// deliberately excluded: it is stamped after the id exists.
    fn calculate_tx_id(&self) -> String {
        let input = format!(
            "{}{}{}{}{}",
            self.file_hash, self.uploader, self.size, self.trust_score, self.signature
        );
        sha256_hex(input.as_bytes())
    }

    /// Recompute the identifier from content and compare it to the stored
    /// one. Used when re-validating chains received from peers.
    pub fn verify_id(&self) -> bool {
        self.calculate_tx_id() == self.tx_id
    }

    pub fn get_id(&self) -> &str {
        self.tx_id.as_str()
    }

    pub fn get_file_hash(&self) -> &str {
        self.file_hash.as_str()
    }

    pub fn get_uploader(&self) -> &str {
        self.uploader.as_str()
    }

    pub fn get_size(&self) -> u64 {
        self.size
    }

    pub fn get_trust_score(&self) -> f64 {
        self.trust_score
    }

    pub fn get_validators(&self) -> &[String] {
        self.validators.as_slice()
    }

    pub fn get_signature(&self) -> &str {
        self.signature.as_str()
    }

    /// Record a validator's endorsement gathered at admission time.
    pub fn add_endorsement(&mut self, validator_id: String) {
        if !self.validators.contains(&validator_id) {
            self.validators.push(validator_id);
        }
    }
}
