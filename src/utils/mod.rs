//! Utility functions and helpers
//!
//! This module contains cryptographic utilities, hex encoding helpers,
//! and the file fingerprint routine used by upload attestations.

pub mod crypto;
pub mod files;

pub use crypto::{
    ecdsa_p256_sha256_sign_digest, ecdsa_p256_sha256_sign_verify, new_key_pair, sha256_digest,
    sha256_hex,
};
pub use files::hash_file;
