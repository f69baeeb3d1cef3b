//! # Schnorr Proof Verification (Fiat–Shamir)
//!
//! A holder who knows the content digest behind a commitment `C = x * G`
//! proves it without revealing `x`:
//!
//! ```text
//! prover:    R = k * G,  e = H(R.x ‖ R.y ‖ C ‖ id ‖ context) mod n,  s = k + e*x
//! verifier:  s * G == R + e * C
//! ```
//!
//! `R.x`/`R.y` are fixed 32-byte big-endian, `C` is the 33-byte compressed
//! commitment, `id` and `context` are UTF-8. Binding the document id and the
//! caller's context into the challenge stops a proof for one document (or
//! one session) from being replayed against another.
//!
//! The verifier is a pure function returning `bool`. Every parse failure,
//! off-curve point or failed equation is a plain `false`; the reason goes to
//! the debug log and nowhere else.

use std::fmt;

use k256::elliptic_curve::sec1::FromEncodedPoint;
use k256::{AffinePoint, EncodedPoint, ProjectivePoint, Scalar};
use serde::{Deserialize, Serialize};

use super::commitment::{reduce_nonzero, reduce_scalar, Commitment};
use crate::config::SCALAR_LENGTH;
use crate::crypto::hash::sha256_multi;

// ---------------------------------------------------------------------------
// Wire type
// ---------------------------------------------------------------------------

/// A proof as submitted on the wire: the nonce point `R` as affine
/// coordinates and the response scalar `s`, each as hex.
///
/// Each field may carry a `0x` prefix and may omit leading zeros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchnorrProof {
    pub rx: String,
    pub ry: String,
    pub s: String,
}

// ---------------------------------------------------------------------------
// Challenge
// ---------------------------------------------------------------------------

/// Fiat–Shamir challenge `e = SHA-256(rx ‖ ry ‖ C ‖ id ‖ context) mod n`.
pub fn challenge(
    rx: &[u8; SCALAR_LENGTH],
    ry: &[u8; SCALAR_LENGTH],
    commitment: &Commitment,
    document_id: &str,
    context: &str,
) -> Scalar {
    let hash = sha256_multi(&[
        rx,
        ry,
        commitment.as_bytes(),
        document_id.as_bytes(),
        context.as_bytes(),
    ]);
    reduce_scalar(&hash)
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Where a proof was rejected. Logged, never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Commitment,
    NonceEncoding,
    NonceOffCurve,
    NonceIdentity,
    Response,
    Equation,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Rejection::Commitment => "commitment",
            Rejection::NonceEncoding => "nonce_encoding",
            Rejection::NonceOffCurve => "nonce_off_curve",
            Rejection::NonceIdentity => "nonce_identity",
            Rejection::Response => "response",
            Rejection::Equation => "equation",
        };
        f.write_str(stage)
    }
}

/// Verify a Schnorr proof of knowledge of the discrete log of
/// `commitment_hex`, bound to `document_id` and `context`.
///
/// Never panics and never errors.
pub fn verify_proof(
    commitment_hex: &str,
    document_id: &str,
    proof: &SchnorrProof,
    context: &str,
) -> bool {
    match check(commitment_hex, document_id, proof, context) {
        Ok(()) => true,
        Err(stage) => {
            tracing::debug!(%document_id, %stage, "schnorr proof rejected");
            false
        }
    }
}

fn check(
    commitment_hex: &str,
    document_id: &str,
    proof: &SchnorrProof,
    context: &str,
) -> Result<(), Rejection> {
    let commitment = Commitment::from_hex(commitment_hex).map_err(|_| Rejection::Commitment)?;
    let c = commitment.to_point().map_err(|_| Rejection::Commitment)?;

    let rx = parse_hex32(&proof.rx).ok_or(Rejection::NonceEncoding)?;
    let ry = parse_hex32(&proof.ry).ok_or(Rejection::NonceEncoding)?;
    let r = nonce_point(&rx, &ry)?;

    let s_bytes = parse_hex32(&proof.s).ok_or(Rejection::Response)?;
    let s = reduce_nonzero(&s_bytes);

    let e = challenge(&rx, &ry, &commitment, document_id, context);

    let lhs = ProjectivePoint::GENERATOR * s;
    let rhs = r + c * e;
    if lhs == rhs {
        Ok(())
    } else {
        Err(Rejection::Equation)
    }
}

/// Rebuild `R` from affine coordinates, insisting it is on the curve.
fn nonce_point(
    rx: &[u8; SCALAR_LENGTH],
    ry: &[u8; SCALAR_LENGTH],
) -> Result<ProjectivePoint, Rejection> {
    let encoded = EncodedPoint::from_affine_coordinates(&(*rx).into(), &(*ry).into(), false);
    let affine: Option<AffinePoint> = AffinePoint::from_encoded_point(&encoded).into();
    let point = ProjectivePoint::from(affine.ok_or(Rejection::NonceOffCurve)?);
    if point == ProjectivePoint::IDENTITY {
        return Err(Rejection::NonceIdentity);
    }
    Ok(point)
}

/// Parse a hex integer of at most 32 bytes into fixed big-endian form.
///
/// Accepts an optional `0x`/`0X` prefix and odd lengths; rejects empty
/// input and anything wider than 64 hex digits.
pub(crate) fn parse_hex32(input: &str) -> Option<[u8; SCALAR_LENGTH]> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || digits.len() > SCALAR_LENGTH * 2 {
        return None;
    }

    let padded = format!("{digits:0>width$}", width = SCALAR_LENGTH * 2);
    let mut out = [0u8; SCALAR_LENGTH];
    hex::decode_to_slice(padded, &mut out).ok()?;
    Some(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::digest;
    use crate::zkp::commitment::derive_commitment;
    use crate::zkp::prover::prove;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ID: &str = "INV-1234-5678";

    fn setup() -> (String, SchnorrProof) {
        let mut rng = StdRng::seed_from_u64(42);
        let d = digest("invoice total: 100.00 usd").unwrap();
        let c = derive_commitment(&d).to_hex();
        let proof = prove(&d, ID, "", &mut rng);
        (c, proof)
    }

    #[test]
    fn verify_valid_proof() {
        let (c, proof) = setup();
        assert!(verify_proof(&c, ID, &proof, ""));
    }

    #[test]
    fn proof_is_bound_to_document_id() {
        let (c, proof) = setup();
        assert!(!verify_proof(&c, "INV-0000-0000", &proof, ""));
    }

    #[test]
    fn proof_is_bound_to_context() {
        let mut rng = StdRng::seed_from_u64(7);
        let d = digest("contract v2").unwrap();
        let c = derive_commitment(&d).to_hex();
        let proof = prove(&d, ID, "session-1", &mut rng);
        assert!(verify_proof(&c, ID, &proof, "session-1"));
        assert!(!verify_proof(&c, ID, &proof, "session-2"));
        assert!(!verify_proof(&c, ID, &proof, ""));
    }

    #[test]
    fn proof_for_other_digest_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let (c, _) = setup();
        let other = digest("invoice total: 999.00 usd").unwrap();
        let forged = prove(&other, ID, "", &mut rng);
        assert!(!verify_proof(&c, ID, &forged, ""));
    }

    #[test]
    fn tampered_response_is_rejected() {
        let (c, mut proof) = setup();
        let last = proof.s.pop().unwrap();
        proof.s.push(if last == '0' { '1' } else { '0' });
        assert!(!verify_proof(&c, ID, &proof, ""));
    }

    #[test]
    fn accepts_prefixed_and_unpadded_hex() {
        let (c, proof) = setup();
        let relaxed = SchnorrProof {
            rx: format!("0x{}", proof.rx),
            ry: format!("0X{}", proof.ry.to_uppercase()),
            s: proof.s.trim_start_matches('0').to_string(),
        };
        assert!(verify_proof(&c, ID, &relaxed, ""));
    }

    #[test]
    fn malformed_fields_are_rejected_not_panicking() {
        let (c, proof) = setup();
        let cases = [
            SchnorrProof { rx: String::new(), ..proof.clone() },
            SchnorrProof { ry: "not hex".into(), ..proof.clone() },
            SchnorrProof { s: "1".repeat(65), ..proof.clone() },
            SchnorrProof { rx: "0x".into(), ..proof.clone() },
        ];
        for bad in &cases {
            assert!(!verify_proof(&c, ID, bad, ""));
        }
    }

    #[test]
    fn off_curve_nonce_is_rejected() {
        let (c, proof) = setup();
        // (1, 1) does not satisfy y^2 = x^3 + 7.
        let bad = SchnorrProof { rx: "1".into(), ry: "1".into(), ..proof };
        assert!(!verify_proof(&c, ID, &bad, ""));
    }

    #[test]
    fn malformed_commitment_is_rejected() {
        let (c, proof) = setup();
        assert!(!verify_proof(&c[..64], ID, &proof, ""));
        assert!(!verify_proof(&format!("04{}", &c[2..]), ID, &proof, ""));
        assert!(!verify_proof("", ID, &proof, ""));
    }

    #[test]
    fn challenge_layout_is_fixed() {
        let d = digest("layout").unwrap();
        let c = derive_commitment(&d);
        let rx = [1u8; 32];
        let ry = [2u8; 32];
        let mut manual = Vec::new();
        manual.extend_from_slice(&rx);
        manual.extend_from_slice(&ry);
        manual.extend_from_slice(c.as_bytes());
        manual.extend_from_slice(ID.as_bytes());
        manual.extend_from_slice(b"ctx");
        let expected = reduce_scalar(&crate::crypto::sha256_array(&manual));
        assert_eq!(challenge(&rx, &ry, &c, ID, "ctx"), expected);
    }

    #[test]
    fn parse_hex32_left_pads() {
        let parsed = parse_hex32("0xabc").unwrap();
        assert_eq!(parsed[..30], [0u8; 30]);
        assert_eq!(parsed[30..], [0x0a, 0xbc]);
        assert!(parse_hex32("").is_none());
        assert!(parse_hex32(&"f".repeat(65)).is_none());
    }
}
