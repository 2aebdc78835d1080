use serde::{Deserialize, Serialize};

/// A validator's signed approval of a specific block, kept alongside the
/// chain rather than folded into the block itself so a committed block's
/// hash is never touched after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    block_hash: String,
    validator_id: String,
    signature: String,
}

impl Attestation {
    pub fn new(block_hash: String, validator_id: String, signature: String) -> Attestation {
        Attestation {
            block_hash,
            validator_id,
            signature,
        }
    }

    pub fn get_block_hash(&self) -> &str {
        self.block_hash.as_str()
    }

    pub fn get_validator_id(&self) -> &str {
        self.validator_id.as_str()
    }

    pub fn get_signature(&self) -> &str {
        self.signature.as_str()
    }

    /// Check the signature against the attesting validator's public key.
    pub fn verify(&self, public_key_hex: &str) -> bool {
        crate::wallet::verify_signature(public_key_hex, &self.block_hash, &self.signature)
    }
}
