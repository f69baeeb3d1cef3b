//! Content digests.

use std::fmt;

use crate::crypto::hash::sha256_array;
use crate::error::{DocSealError, DocSealResult};

/// SHA-256 of a document's canonical text. Immutable once computed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a 64-character hex digest.
    pub fn from_hex(hex_str: &str) -> DocSealResult<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex_str.trim(), &mut bytes)
            .map_err(|e| DocSealError::crypto(format!("invalid content digest: {e}")))?;
        Ok(Self(bytes))
    }

    /// The raw bytes, big-endian as produced by SHA-256.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Digest canonical text. `None` for empty text: we never commit to a blank
/// document.
pub fn digest(canonical_text: &str) -> Option<ContentDigest> {
    if canonical_text.is_empty() {
        return None;
    }
    Some(ContentDigest(sha256_array(canonical_text.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_digest() {
        assert!(digest("").is_none());
    }

    #[test]
    fn known_vector() {
        let d = digest("abc").unwrap();
        assert_eq!(
            d.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hex_round_trip() {
        let d = digest("invoice total: 100.00 usd").unwrap();
        let parsed = ContentDigest::from_hex(&d.to_hex()).unwrap();
        assert_eq!(parsed, d);
    }

    #[test]
    fn malformed_hex_is_a_crypto_error() {
        let err = ContentDigest::from_hex("abcd").unwrap_err();
        assert!(matches!(err, DocSealError::Crypto(_)));
        assert!(ContentDigest::from_hex(&"zz".repeat(32)).is_err());
    }
}
