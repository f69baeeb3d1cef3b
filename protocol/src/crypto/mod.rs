//! # Cryptographic Primitives for DocSeal
//!
//! Hashing and payload authentication. The elliptic-curve side (commitments
//! and Schnorr proofs) lives in [`crate::zkp`].
//!
//! - **SHA-256** for file hashes, content digests, checksums and Fiat–Shamir
//!   challenges.
//! - **HMAC-SHA256** for the integrity signature over verification payloads.
//!
//! Everything here wraps RustCrypto implementations. Comparisons of secret
//! material go through `subtle`.

pub mod hash;
pub mod signatures;

pub use hash::{checksum, sha256, sha256_array, sha256_hex};
pub use signatures::IntegritySigner;
