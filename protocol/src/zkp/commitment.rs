//! # Content Commitments over secp256k1
//!
//! A document's commitment is the public point
//!
//! ```text
//! x = digest mod n      (digest read as a big-endian 256-bit integer)
//! x = 1  if x == 0
//! C = x * G
//! ```
//!
//! encoded as a 33-byte SEC1 compressed point (`0x02`/`0x03` tag plus X).
//! The discrete log of `C` is the reduced content digest, which is what a
//! holder later proves knowledge of.
//!
//! ## Why substitute 1 for 0?
//!
//! `0 * G` is the point at infinity, which has no compressed encoding. The
//! chance of a SHA-256 output landing on a multiple of `n` is negligible,
//! but the substitution makes derivation total, and every implementation
//! must apply exactly this rule or their commitments diverge.

use std::fmt;

use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar, U256};

use crate::canonical::ContentDigest;
use crate::config::COMPRESSED_POINT_LENGTH;
use crate::error::{DocSealError, DocSealResult};

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

/// Reduce 32 big-endian bytes modulo the group order. Zero stays zero.
pub(crate) fn reduce_scalar(bytes: &[u8; 32]) -> Scalar {
    let field_bytes: FieldBytes = (*bytes).into();
    <Scalar as Reduce<U256>>::reduce_bytes(&field_bytes)
}

/// Reduce modulo the group order, mapping zero to one.
pub(crate) fn reduce_nonzero(bytes: &[u8; 32]) -> Scalar {
    let scalar = reduce_scalar(bytes);
    if bool::from(scalar.is_zero()) {
        Scalar::ONE
    } else {
        scalar
    }
}

/// The secret scalar behind a document's commitment.
pub fn digest_to_scalar(digest: &ContentDigest) -> Scalar {
    reduce_nonzero(digest.as_bytes())
}

// ---------------------------------------------------------------------------
// Commitment
// ---------------------------------------------------------------------------

/// A compressed secp256k1 point committing to a content digest.
///
/// Construction through [`derive_commitment`] or [`Commitment::from_hex`]
/// guarantees the bytes decode to a valid, non-identity curve point.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Commitment([u8; COMPRESSED_POINT_LENGTH]);

impl Commitment {
    /// Commit to an already-reduced, non-zero scalar.
    pub(crate) fn from_scalar(x: &Scalar) -> Self {
        let point = (ProjectivePoint::GENERATOR * x).to_affine();
        let encoded = point.to_encoded_point(true);
        let mut bytes = [0u8; COMPRESSED_POINT_LENGTH];
        bytes.copy_from_slice(encoded.as_bytes());
        Self(bytes)
    }

    /// Parse 33 compressed bytes, checking the tag and that X lies on the
    /// curve.
    pub fn from_bytes(bytes: &[u8]) -> DocSealResult<Self> {
        if bytes.len() != COMPRESSED_POINT_LENGTH {
            return Err(DocSealError::crypto(format!(
                "commitment must be {COMPRESSED_POINT_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }
        if bytes[0] != 0x02 && bytes[0] != 0x03 {
            return Err(DocSealError::crypto(format!(
                "commitment has tag 0x{:02x}, expected a compressed point",
                bytes[0]
            )));
        }
        let encoded = EncodedPoint::from_bytes(bytes)
            .map_err(|e| DocSealError::crypto(format!("malformed commitment: {e}")))?;
        let point: Option<AffinePoint> = AffinePoint::from_encoded_point(&encoded).into();
        if point.is_none() {
            return Err(DocSealError::crypto("commitment is not on secp256k1"));
        }

        let mut out = [0u8; COMPRESSED_POINT_LENGTH];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Parse the 66-character hex wire form.
    pub fn from_hex(hex_str: &str) -> DocSealResult<Self> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|e| DocSealError::crypto(format!("commitment is not hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// The compressed SEC1 bytes.
    pub fn as_bytes(&self) -> &[u8; COMPRESSED_POINT_LENGTH] {
        &self.0
    }

    /// Lowercase hex, 66 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decompress into a curve point for arithmetic.
    pub fn to_point(&self) -> DocSealResult<ProjectivePoint> {
        let encoded = EncodedPoint::from_bytes(self.0)
            .map_err(|e| DocSealError::crypto(format!("malformed commitment: {e}")))?;
        let point: Option<AffinePoint> = AffinePoint::from_encoded_point(&encoded).into();
        point
            .map(ProjectivePoint::from)
            .ok_or_else(|| DocSealError::crypto("commitment is not on secp256k1"))
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", self.to_hex())
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Derive the public commitment for a content digest.
///
/// ```
/// use docseal_protocol::canonical::digest;
/// use docseal_protocol::zkp::derive_commitment;
///
/// let d = digest("invoice total: 100.00 usd").unwrap();
/// let c = derive_commitment(&d);
/// assert_eq!(c.to_hex().len(), 66);
/// assert_eq!(c, derive_commitment(&d));
/// ```
pub fn derive_commitment(digest: &ContentDigest) -> Commitment {
    Commitment::from_scalar(&digest_to_scalar(digest))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
