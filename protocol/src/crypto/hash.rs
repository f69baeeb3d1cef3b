//! # Hashing Utilities
//!
//! SHA-256 in the three shapes callers want (`Vec`, array, hex), plus the
//! payload checksum.
//!
//! ## Checksum
//!
//! The checksum is a short, human-comparable fingerprint of
//! `(id, commitment, file_hash)`:
//!
//! ```text
//! upper(hex(SHA-256("{id}:{zk_commitment}:{file_hash}"))[..12])
//! ```
//!
//! It is printed next to the QR code so a person can eyeball that two
//! copies of an attestation refer to the same document. It is not a
//! security boundary; the HMAC signature is.

use sha2::{Digest, Sha256};

use crate::config::CHECKSUM_HEX_LENGTH;

/// SHA-256 of the input as a `Vec<u8>`.
///
/// # Example
///
/// ```
/// use docseal_protocol::crypto::sha256;
///
/// let hash = sha256(b"DocSeal");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    sha256_array(data).to_vec()
}

/// SHA-256 of the input as a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 of the input as lowercase hex. This is the `file_hash` format.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256_array(data))
}

/// SHA-256 over several byte slices fed in order, without concatenating.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// The 12-character uppercase payload checksum.
pub fn checksum(document_id: &str, zk_commitment: &str, file_hash: &str) -> String {
    let seed = format!("{document_id}:{zk_commitment}:{file_hash}");
    let mut digest = sha256_hex(seed.as_bytes());
    digest.truncate(CHECKSUM_HEX_LENGTH);
    digest.make_ascii_uppercase();
    digest
}
