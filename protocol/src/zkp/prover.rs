//! # Schnorr Proof Generation
//!
//! The holder side of the content proof. Whoever has the document can
//! recompute its canonical digest, and the digest (reduced mod n) is the
//! discrete log of the published commitment. [`prove`] turns that knowledge
//! into a non-interactive proof bound to a document id and a context string.
//!
//! The node uses this for its `prove` subcommand; tests and benches use it
//! to produce proofs the verifier can check.

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::Field;
use k256::{ProjectivePoint, Scalar};
use rand_core::{CryptoRng, RngCore};

use super::commitment::{digest_to_scalar, Commitment};
use super::verifier::{challenge, SchnorrProof};
use crate::canonical::ContentDigest;
use crate::config::SCALAR_LENGTH;

/// Prove knowledge of `digest` for the commitment derived from it.
///
/// Each call draws a fresh nonce, so two proofs for the same inputs differ
/// but both verify.
pub fn prove<R: RngCore + CryptoRng>(
    digest: &ContentDigest,
    document_id: &str,
    context: &str,
    rng: &mut R,
) -> SchnorrProof {
    let x = digest_to_scalar(digest);
    let commitment = Commitment::from_scalar(&x);

    let k = loop {
        let candidate = Scalar::random(&mut *rng);
        if !bool::from(candidate.is_zero()) {
            break candidate;
        }
    };

    let nonce = (ProjectivePoint::GENERATOR * k).to_affine();
    let encoded = nonce.to_encoded_point(false);
    let mut rx = [0u8; SCALAR_LENGTH];
    let mut ry = [0u8; SCALAR_LENGTH];
    rx.copy_from_slice(encoded.x().expect("non-identity point has an x coordinate"));
    ry.copy_from_slice(encoded.y().expect("uncompressed point has a y coordinate"));

    let e = challenge(&rx, &ry, &commitment, document_id, context);
    let s = k + e * x;

    SchnorrProof {
        rx: hex::encode(rx),
        ry: hex::encode(ry),
        s: hex::encode(s.to_bytes()),
    }
}
