//! Canonical JSON and the compact QR encoding.
//!
//! ```text
//! encode(p) = base64url(canonical_json(p))      padded, URL-safe alphabet
//! ```
//!
//! Canonical JSON here means: object keys sorted by byte order at every
//! depth, no whitespace, UTF-8 output. Decoding accepts the encoded string
//! with or without `=` padding, since some QR readers strip it.

use base64::alphabet;
use base64::engine::general_purpose::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::Serialize;
use serde_json::Value;

use super::{CodecError, SignedPayload};

/// URL-safe decoder that tolerates missing padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Serialize with sorted keys and no incidental whitespace.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    let value = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&sort_keys(value))?)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Encode a signed payload for the QR code.
pub fn encode(payload: &SignedPayload) -> Result<String, CodecError> {
    Ok(URL_SAFE.encode(canonical_json(payload)?))
}

/// Decode a scanned QR string back into the signed payload.
pub fn decode(encoded: &str) -> Result<SignedPayload, CodecError> {
    let bytes = URL_SAFE_LENIENT.decode(encoded.trim())?;
    Ok(serde_json::from_slice(&bytes)?)
}
