//! # Verification Payloads
//!
//! The record a verifier sees when they scan a document's code, in three
//! nested shapes:
//!
//! | Type                    | Fields                                         |
//! |-------------------------|------------------------------------------------|
//! | [`SignableFields`]      | what the integrity signature covers            |
//! | [`SignedPayload`]       | the above plus `signature`; the QR contents    |
//! | [`VerificationPayload`] | the above plus `qr_payload` and `qr_png`       |
//!
//! Each is a closed struct whose fields are declared in alphabetical order,
//! so the serialized form of every shape is already the canonical one.
//! [`codec::canonical_json`] sorts keys anyway.

pub mod codec;
pub mod qr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use codec::{canonical_json, decode, encode};
pub use qr::{render_code, render_code_base64};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures while encoding, decoding or rendering a payload.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("qr encoding failed: {0}")]
    Qr(#[from] qrcode::types::QrError),

    #[error("png encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("cannot sign {0}")]
    Unsignable(&'static str),
}

// ---------------------------------------------------------------------------
// Payload shapes
// ---------------------------------------------------------------------------

/// The fields authenticated by the integrity signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignableFields {
    pub checksum: String,
    pub file_hash: String,
    pub id: String,
    pub issued_at: String,
    pub normalization_strategy: String,
    pub zk_commitment: String,
}

/// Signable fields plus their signature. This is what the QR code carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPayload {
    pub checksum: String,
    pub file_hash: String,
    pub id: String,
    pub issued_at: String,
    pub normalization_strategy: String,
    pub signature: String,
    pub zk_commitment: String,
}

impl SignedPayload {
    /// Attach a signature to a field set.
    pub fn new(fields: SignableFields, signature: String) -> Self {
        Self {
            checksum: fields.checksum,
            file_hash: fields.file_hash,
            id: fields.id,
            issued_at: fields.issued_at,
            normalization_strategy: fields.normalization_strategy,
            signature,
            zk_commitment: fields.zk_commitment,
        }
    }

    /// The subset covered by the signature.
    pub fn signable(&self) -> SignableFields {
        SignableFields {
            checksum: self.checksum.clone(),
            file_hash: self.file_hash.clone(),
            id: self.id.clone(),
            issued_at: self.issued_at.clone(),
            normalization_strategy: self.normalization_strategy.clone(),
            zk_commitment: self.zk_commitment.clone(),
        }
    }
}

/// Everything the verification endpoint returns for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationPayload {
    pub checksum: String,
    pub file_hash: String,
    pub id: String,
    pub issued_at: String,
    pub normalization_strategy: String,
    /// URL-safe base64 of the canonical [`SignedPayload`] JSON.
    pub qr_payload: String,
    /// Base64 (standard alphabet) PNG of the QR code.
    pub qr_png: String,
    pub signature: String,
    pub zk_commitment: String,
}

impl VerificationPayload {
    /// Combine a signed payload with its rendered artifacts.
    pub fn new(signed: SignedPayload, qr_payload: String, qr_png: String) -> Self {
        Self {
            checksum: signed.checksum,
            file_hash: signed.file_hash,
            id: signed.id,
            issued_at: signed.issued_at,
            normalization_strategy: signed.normalization_strategy,
            qr_payload,
            qr_png,
            signature: signed.signature,
            zk_commitment: signed.zk_commitment,
        }
    }

    /// The part that goes into the QR code.
    pub fn signed(&self) -> SignedPayload {
        SignedPayload {
            checksum: self.checksum.clone(),
            file_hash: self.file_hash.clone(),
            id: self.id.clone(),
            issued_at: self.issued_at.clone(),
            normalization_strategy: self.normalization_strategy.clone(),
            signature: self.signature.clone(),
            zk_commitment: self.zk_commitment.clone(),
        }
    }
}
