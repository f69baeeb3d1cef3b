//! # Zero-Knowledge Content Proofs
//!
//! A document's content digest is turned into a public secp256k1 point at
//! ingestion. Later, anyone holding the document can prove they know the
//! digest behind that point with a Schnorr proof made non-interactive by
//! Fiat–Shamir, without revealing the digest itself.
//!
//! ## Architecture
//!
//! ```text
//! commitment.rs   — digest → scalar → compressed point (derive_commitment)
//! prover.rs       — holder-side proof generation (prove)
//! verifier.rs     — challenge construction and verification (verify_proof)
//! ```
//!
//! ## Security Model
//!
//! - **Binding**: finding a second digest for the same commitment means
//!   breaking DLOG on secp256k1 or finding a SHA-256 collision mod n.
//! - **Soundness**: special soundness of Schnorr in the random-oracle model.
//! - **Replay**: the challenge covers the document id and a caller-chosen
//!   context, so proofs do not transfer between documents or sessions.
//!
//! The commitment is not hiding in the Pedersen sense: anyone who has the
//! document can recompute it. That is the point. The proof shows possession
//! of the content, and the commitment reveals nothing to those without it.
//!
//! ## Point validity
//!
//! secp256k1 has cofactor 1, so every on-curve point other than the
//! identity lies in the prime-order subgroup. Decoding checks that points
//! are on the curve and the verifier rejects an identity nonce; no separate
//! subgroup check is needed.

pub mod commitment;
pub mod prover;
pub mod verifier;

pub use commitment::{derive_commitment, digest_to_scalar, Commitment};
pub use prover::prove;
pub use verifier::{challenge, verify_proof, SchnorrProof};
