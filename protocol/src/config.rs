//! # Protocol Configuration & Constants
//!
//! Every magic number in DocSeal lives here. Several of them are baked into
//! payloads that are already printed on paper as QR codes, so changing one
//! after launch means every previously issued attestation stops verifying.
//!
//! The runtime half of this module is [`ProtocolConfig`]: the signing secret
//! and the few knobs an operator may set at startup. It is built once and
//! shared immutably; there is no runtime reconfiguration.

use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// The protocol version string, surfaced by the node's `version` command.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Curve used for content commitments and Schnorr proofs.
pub const COMMITMENT_CURVE: &str = "secp256k1";

/// Hash used for content digests, file hashes, checksums and challenges.
pub const CONTENT_HASH: &str = "SHA-256";

/// MAC used by the integrity signer.
pub const SIGNATURE_ALGORITHM: &str = "HMAC-SHA256";

/// Length of a SHA-256 digest in bytes.
pub const HASH_OUTPUT_LENGTH: usize = 32;

/// Length of a SEC1 compressed secp256k1 point: one tag byte plus X.
pub const COMPRESSED_POINT_LENGTH: usize = 33;

/// Length of a scalar or coordinate on the wire, in bytes.
pub const SCALAR_LENGTH: usize = 32;

/// Number of hex characters kept from the checksum digest.
///
/// 48 bits. Collisions are possible in principle; the checksum is a visual
/// fingerprint for humans comparing printouts, the signature is what binds.
pub const CHECKSUM_HEX_LENGTH: usize = 12;

// ---------------------------------------------------------------------------
// Canonicalization
// ---------------------------------------------------------------------------

/// Identifier recorded on every document for the canonicalization rules in
/// [`crate::canonical::canonicalize`].
pub const NORMALIZATION_STRATEGY: &str = "unicode_nfkc_lowercase_whitespace_collapse";

// ---------------------------------------------------------------------------
// Signing Secret
// ---------------------------------------------------------------------------

/// Environment variable holding the signing secret.
pub const SIGNING_SECRET_ENV: &str = "DOCUMENT_SIGNING_SECRET";

/// Well-known development secret. Anyone can forge signatures made with it;
/// the node warns loudly at startup when it is in use.
pub const DEFAULT_SIGNING_SECRET: &str = "dev-signing-secret";

// ---------------------------------------------------------------------------
// Scannable Code
// ---------------------------------------------------------------------------

/// Pixel size of one QR module in the rendered PNG.
pub const QR_MODULE_PIXELS: u32 = 8;

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Prefix of generated document ids (`INV-1234-5678`).
pub const DOCUMENT_ID_PREFIX: &str = "INV";

/// Digits in each numeric group of a generated document id.
pub const DOCUMENT_ID_GROUP_DIGITS: usize = 4;

/// Longest document id accepted on lookup.
pub const MAX_DOCUMENT_ID_LENGTH: usize = 64;

/// How many fresh ids ingestion tries before giving up on collisions.
pub const DOCUMENT_ID_ATTEMPTS: usize = 16;

/// Status given to freshly ingested documents.
pub const DEFAULT_DOCUMENT_STATUS: &str = "active";

// ---------------------------------------------------------------------------
// Persistence Retry
// ---------------------------------------------------------------------------

/// Attempts made to persist healed payload fields before reporting a warning.
pub const PERSIST_MAX_ATTEMPTS: u32 = 3;

/// Delay before the first persistence retry.
pub const PERSIST_INITIAL_BACKOFF: Duration = Duration::from_millis(25);

/// Upper bound on the delay between persistence retries.
pub const PERSIST_MAX_BACKOFF: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// Runtime Configuration
// ---------------------------------------------------------------------------

/// Bounded retry schedule for store writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each attempt after that.
    pub initial_backoff: Duration,
    /// Cap on the doubled delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: PERSIST_MAX_ATTEMPTS,
            initial_backoff: PERSIST_INITIAL_BACKOFF,
            max_backoff: PERSIST_MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// A policy that retries immediately. Used by tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay to wait after the given failed attempt (1-indexed).
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Process-wide configuration, built once at startup.
#[derive(Clone)]
pub struct ProtocolConfig {
    signing_secret: Vec<u8>,
    /// Strategy id stamped on new documents.
    pub normalization_strategy: String,
    /// Retry schedule for persisting healed payload fields.
    pub retry: RetryPolicy,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            signing_secret: DEFAULT_SIGNING_SECRET.as_bytes().to_vec(),
            normalization_strategy: NORMALIZATION_STRATEGY.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ProtocolConfig {
    /// Read the signing secret from [`SIGNING_SECRET_ENV`], falling back to
    /// the development default when unset or empty.
    pub fn from_env() -> Self {
        match std::env::var(SIGNING_SECRET_ENV) {
            Ok(secret) if !secret.is_empty() => Self::default().with_signing_secret(secret),
            _ => Self::default(),
        }
    }

    /// Replace the signing secret.
    pub fn with_signing_secret(mut self, secret: impl AsRef<[u8]>) -> Self {
        self.signing_secret = secret.as_ref().to_vec();
        self
    }

    /// Replace the persistence retry schedule.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Raw signing secret bytes.
    pub fn signing_secret(&self) -> &[u8] {
        &self.signing_secret
    }

    /// `true` when the well-known development secret is in use.
    pub fn uses_default_secret(&self) -> bool {
        self.signing_secret == DEFAULT_SIGNING_SECRET.as_bytes()
    }
}

impl fmt::Debug for ProtocolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolConfig")
            .field("signing_secret", &"[REDACTED]")
            .field("normalization_strategy", &self.normalization_strategy)
            .field("retry", &self.retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_dev_secret() {
        let config = ProtocolConfig::default();
        assert!(config.uses_default_secret());
        assert_eq!(config.signing_secret(), b"dev-signing-secret");
        assert_eq!(config.normalization_strategy, NORMALIZATION_STRATEGY);
    }

    #[test]
    fn overridden_secret_is_not_default() {
        let config = ProtocolConfig::default().with_signing_secret("prod-secret");
        assert!(!config.uses_default_secret());
        assert_eq!(config.signing_secret(), b"prod-secret");
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = ProtocolConfig::default().with_signing_secret("hunter2");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(35),
        };
        assert_eq!(policy.backoff_after(1), Duration::from_millis(10));
        assert_eq!(policy.backoff_after(2), Duration::from_millis(20));
        assert_eq!(policy.backoff_after(3), Duration::from_millis(35));
        assert_eq!(policy.backoff_after(30), Duration::from_millis(35));
    }

    #[test]
    fn crypto_parameter_sizes() {
        assert_eq!(HASH_OUTPUT_LENGTH, 32);
        assert_eq!(COMPRESSED_POINT_LENGTH, 33);
        assert_eq!(SCALAR_LENGTH, 32);
        assert!(CHECKSUM_HEX_LENGTH <= HASH_OUTPUT_LENGTH * 2);
    }
}
