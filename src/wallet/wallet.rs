use crate::error::{LedgerError, Result};
use crate::utils::{ecdsa_p256_sha256_sign_digest, ecdsa_p256_sha256_sign_verify, new_key_pair};
use data_encoding::HEXLOWER;
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING};

/// An ECDSA P-256 keypair. The lowercase-hex public key doubles as the
/// owner's identity on the ledger (uploader and validator ids).
#[derive(Clone)]
pub struct Wallet {
    pkcs8: Vec<u8>,
    public_key: Vec<u8>,
}

impl Wallet {
    pub fn new() -> Result<Wallet> {
        let pkcs8 = new_key_pair()?;
        let rng = SystemRandom::new();
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8.as_ref(), &rng)
                .map_err(|e| {
                    LedgerError::Crypto(format!("Failed to create key pair from PKCS8: {e}"))
                })?;
        let public_key = key_pair.public_key().as_ref().to_vec();
        Ok(Wallet { pkcs8, public_key })
    }

    pub fn get_public_key(&self) -> &[u8] {
        self.public_key.as_slice()
    }

    pub fn public_key_hex(&self) -> String {
        HEXLOWER.encode(self.public_key.as_slice())
    }

    /// Sign an arbitrary string, returning a detached hex signature.
    pub fn sign_data(&self, data: &str) -> Result<String> {
        let signature = ecdsa_p256_sha256_sign_digest(self.pkcs8.as_slice(), data.as_bytes())?;
        Ok(HEXLOWER.encode(signature.as_slice()))
    }
}

/// Verify a detached hex signature against a hex public key and the
/// original data.
pub fn verify_signature(public_key_hex: &str, data: &str, signature_hex: &str) -> bool {
    let public_key = match HEXLOWER.decode(public_key_hex.as_bytes()) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let signature = match HEXLOWER.decode(signature_hex.as_bytes()) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    ecdsa_p256_sha256_sign_verify(
        public_key.as_slice(),
        signature.as_slice(),
        data.as_bytes(),
    )
}
