//! # Integrity Signatures
//!
//! HMAC-SHA256 over the signing message of a payload's signable fields.
//!
//! This is a MAC, not a public-key signature: only a holder of the signing
//! secret can produce or check one. Scanning a printed attestation and
//! calling back to the issuing node is how a third party verifies it.
//!
//! ## Signing message
//!
//! Both [`IntegritySigner::sign`] and [`IntegritySigner::verify`] go through
//! [`signing_message`], which renders the fields as a key-sorted list of
//! `(key, value)` pairs in Python literal syntax:
//!
//! ```text
//! [('checksum', '0123456789AB'), ('file_hash', 'abab…'), ('id', 'INV-1234-5678'), …]
//! ```
//!
//! Attestations issued before this node existed were signed over exactly
//! this text, so the format is frozen. Field sets that serialize to the same
//! flat object sign identically no matter how they were constructed.
//!
//! ## Known limitation
//!
//! Rotating the secret silently invalidates every stored signature; the
//! orchestrator then re-signs on the next build. A signature therefore says
//! "the current secret holder vouches for these fields", not "signed at T".

use std::fmt;

use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::payload::CodecError;

type HmacSha256 = Hmac<Sha256>;

/// Produces and checks HMAC-SHA256 integrity signatures.
///
/// Cheap to clone. The secret never appears in `Debug` output.
#[derive(Clone)]
pub struct IntegritySigner {
    secret: Vec<u8>,
}

impl IntegritySigner {
    /// Create a signer with the given secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Sign any serializable field set. Returns 64 lowercase hex characters.
    pub fn sign<T: Serialize>(&self, fields: &T) -> Result<String, CodecError> {
        let message = signing_message(fields)?;
        Ok(hex::encode(self.mac(message.as_bytes())))
    }

    /// Check a signature. Malformed signatures and unserializable fields
    /// verify as `false`.
    pub fn verify<T: Serialize>(&self, fields: &T, signature: &str) -> bool {
        let expected = match self.sign(fields) {
            Ok(sig) => sig,
            Err(e) => {
                tracing::debug!(error = %e, "fields could not be serialized for verification");
                return false;
            }
        };
        constant_time_hex_eq(signature, &expected)
    }

    fn mac(&self, message: &[u8]) -> [u8; 32] {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts keys of any length");
        mac.update(message);
        mac.finalize().into_bytes().into()
    }
}

impl fmt::Debug for IntegritySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegritySigner")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Signing message
// ---------------------------------------------------------------------------

/// Render a flat field set as the text the MAC is computed over.
///
/// Values may be strings, integers, booleans or null. Floats and nested
/// values have no stable rendering and are rejected.
pub fn signing_message<T: Serialize + ?Sized>(fields: &T) -> Result<String, CodecError> {
    let Value::Object(map) = serde_json::to_value(fields)? else {
        return Err(CodecError::Unsignable("a value that is not a field map"));
    };
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::from("[");
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('(');
        push_str_literal(&mut out, key);
        out.push_str(", ");
        push_value_literal(&mut out, value)?;
        out.push(')');
    }
    out.push(']');
    Ok(out)
}

fn push_value_literal(out: &mut String, value: &Value) -> Result<(), CodecError> {
    match value {
        Value::String(s) => push_str_literal(out, s),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Null => out.push_str("None"),
        Value::Number(n) if n.is_i64() || n.is_u64() => out.push_str(&n.to_string()),
        Value::Number(_) => return Err(CodecError::Unsignable("a floating-point field")),
        Value::Array(_) | Value::Object(_) => {
            return Err(CodecError::Unsignable("a nested field"))
        }
    }
    Ok(())
}

/// Quote a string the way Python's `repr` does: single quotes unless the
/// text contains a single quote and no double quote, C escapes for tab,
/// newline and carriage return, `\x`/`\u`/`\U` escapes for anything
/// unprintable.
fn push_str_literal(out: &mut String, s: &str) {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            c if is_printable(c) => out.push(c),
            c => {
                let code = u32::from(c);
                let escaped = if code <= 0xff {
                    format!("\\x{code:02x}")
                } else if code <= 0xffff {
                    format!("\\u{code:04x}")
                } else {
                    format!("\\U{code:08x}")
                };
                out.push_str(&escaped);
            }
        }
    }
    out.push(quote);
}

/// Non-ASCII printability: controls, separators and the common invisible
/// format characters are escaped.
fn is_printable(c: char) -> bool {
    !(c.is_control()
        || c.is_whitespace()
        || matches!(
            c,
            '\u{ad}'
                | '\u{600}'..='\u{605}'
                | '\u{200b}'..='\u{200f}'
                | '\u{202a}'..='\u{202e}'
                | '\u{2060}'..='\u{2064}'
                | '\u{feff}'
        ))
}

/// Compare two hex strings without leaking the position of the first
/// mismatch. On a length mismatch a dummy comparison keeps timing flat.
fn constant_time_hex_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}
