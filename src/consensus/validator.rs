use crate::consensus::Attestation;
use crate::core::Block;
use crate::error::Result;
use crate::wallet::Wallet;

/// Default trust threshold a validator demands of uploaded content.
pub const DEFAULT_TRUST_THRESHOLD: f64 = 0.5;

/// A network participant whose approval counts toward quorum. Each
/// validator owns a keypair for signing attestations and accumulates a
/// reward balance for blocks it helped commit.
#[derive(Clone)]
pub struct Validator {
    id: String,
    wallet: Wallet,
    balance: u64,
    trust_threshold: f64,
}

impl Validator {
    pub fn new(id: &str) -> Result<Validator> {
        Self::with_trust_threshold(id, DEFAULT_TRUST_THRESHOLD)
    }

    pub fn with_trust_threshold(id: &str, trust_threshold: f64) -> Result<Validator> {
        Ok(Validator {
            id: id.to_string(),
            wallet: Wallet::new()?,
            balance: 0,
            trust_threshold,
        })
    }

    pub fn get_id(&self) -> &str {
        self.id.as_str()
    }

    pub fn public_key_hex(&self) -> String {
        self.wallet.public_key_hex()
    }

    pub fn get_balance(&self) -> u64 {
        self.balance
    }

    pub fn get_trust_threshold(&self) -> f64 {
        self.trust_threshold
    }

    pub fn reward(&mut self, amount: u64) {
        self.balance += amount;
    }

    /// Produce a signed approval record for a block this validator voted
    /// to accept.
    pub fn attest(&self, block: &Block) -> Result<Attestation> {
        let signature = self.wallet.sign_data(block.get_hash())?;
        Ok(Attestation::new(
            block.get_hash().to_string(),
            self.id.clone(),
            signature,
        ))
    }
}
