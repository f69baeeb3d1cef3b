//! Error taxonomy for DocSeal.
//!
//! Callers see four kinds of failure: bad input ([`DocSealError::Validation`]),
//! bad cryptographic encodings ([`DocSealError::Crypto`]), unknown documents
//! ([`DocSealError::NotFound`]) and store faults ([`DocSealError::Storage`]).
//! Proof verification is deliberately absent from this list: it answers
//! `false`, never `Err`.

use thiserror::Error;

use crate::payload::CodecError;
use crate::storage::StoreError;

/// Top-level error returned by DocSeal operations.
#[derive(Debug, Error)]
pub enum DocSealError {
    /// Input rejected before any work was done: missing commitment,
    /// malformed document id.
    #[error("validation error: {0}")]
    Validation(String),

    /// A point, scalar or digest encoding could not be parsed.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// No document with the given id exists.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The document store failed. Recoverable; the operation may be retried.
    #[error("storage fault: {0}")]
    Storage(#[from] StoreError),

    /// Payload encoding, decoding or QR rendering failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl DocSealError {
    /// Shorthand for [`DocSealError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Shorthand for [`DocSealError::Crypto`].
    pub fn crypto(msg: impl Into<String>) -> Self {
        Self::Crypto(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type DocSealResult<T> = Result<T, DocSealError>;
