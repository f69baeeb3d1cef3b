//! # Verification Service
//!
//! Builds, caches and self-heals a document's verification payload, and
//! checks holder proofs against it.
//!
//! ## Build steps
//!
//! For a stored document with a commitment:
//!
//! 1. `issued_at` is the recorded timestamp, or now if the record lost it.
//! 2. `checksum` is kept if stored, else derived from id, commitment and
//!    file hash.
//! 3. The stored `signature` is checked against the field set; missing or
//!    invalid signatures (a rotated secret, a tampered record) are replaced.
//! 4. A new signature, missing artifacts, or a stored `qr_payload` that no
//!    longer decodes to the signed fields regenerates `qr_payload` and
//!    `qr_png`.
//! 5. Only fields that changed are written back, as one partial update.
//!
//! ## Concurrency
//!
//! Builds for the same id run one at a time under a per-id lock and re-read
//! the record once inside it, so a second caller sees the first caller's
//! healed fields instead of recomputing them. Builds for different ids run
//! in parallel.
//!
//! ## Persistence faults
//!
//! A failed write is retried per [`RetryPolicy`](crate::config::RetryPolicy).
//! If it still fails, the caller gets the computed payload anyway, with
//! [`PersistenceOutcome::Failed`] in the report and a warning in the log.

mod locks;
mod retry;

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use self::locks::KeyedLocks;
use self::retry::retry_sync;
use crate::clock::{isoformat_utc, Clock};
use crate::config::ProtocolConfig;
use crate::crypto::{checksum, IntegritySigner};
use crate::document::normalize_document_id;
use crate::error::{DocSealError, DocSealResult};
use crate::payload::{
    decode, encode, render_code_base64, SignableFields, SignedPayload, VerificationPayload,
};
use crate::storage::{DocumentPatch, DocumentRecord, DocumentStore};
use crate::zkp::{verify_proof, SchnorrProof};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What happened to the healed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceOutcome {
    /// Nothing needed writing.
    Unchanged,
    /// These fields were written.
    Persisted { fields: Vec<&'static str> },
    /// The write failed after `attempts` tries. The payload is still valid;
    /// the next build recomputes and tries again.
    Failed { attempts: u32, error: String },
}

/// A built payload plus what it cost to build it.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub payload: VerificationPayload,
    /// Fields that were (re)computed on this build.
    pub healed: Vec<&'static str>,
    pub persistence: PersistenceOutcome,
}

impl BuildReport {
    /// True when persistence failed and should be surfaced as a warning.
    pub fn has_warning(&self) -> bool {
        matches!(self.persistence, PersistenceOutcome::Failed { .. })
    }
}

/// A holder's proof submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofSubmission {
    pub proof: SchnorrProof,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Outcome of a proof check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid {
        document_id: String,
        verified_at: DateTime<Utc>,
    },
    Invalid,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid { .. })
    }
}

// ---------------------------------------------------------------------------
// VerificationService
// ---------------------------------------------------------------------------

/// Composes canonical digests, commitments, signatures and the payload codec
/// over a [`DocumentStore`].
pub struct VerificationService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    config: ProtocolConfig,
    signer: IntegritySigner,
    locks: KeyedLocks,
}

impl VerificationService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        config: ProtocolConfig,
    ) -> Self {
        let signer = IntegritySigner::new(config.signing_secret());
        Self {
            store,
            clock,
            config,
            signer,
            locks: KeyedLocks::new(),
        }
    }

    /// The signer this service uses.
    pub fn signer(&self) -> &IntegritySigner {
        &self.signer
    }

    /// Resolve a user-supplied id: exact match first, then the cleaned,
    /// upper-cased form.
    pub fn find_document(&self, raw_id: &str) -> DocSealResult<DocumentRecord> {
        if let Some(record) = self.store.get(raw_id)? {
            return Ok(record);
        }
        let cleaned = normalize_document_id(raw_id)?;
        if cleaned != raw_id {
            if let Some(record) = self.store.get(&cleaned)? {
                return Ok(record);
            }
        }
        Err(DocSealError::NotFound(cleaned))
    }

    /// Build (and heal) the verification payload for a document.
    pub fn build_payload(&self, raw_id: &str) -> DocSealResult<BuildReport> {
        let id = self.find_document(raw_id)?.id;
        self.locks.with_lock(&id, || -> DocSealResult<BuildReport> {
            let record = self
                .store
                .get(&id)?
                .ok_or_else(|| DocSealError::NotFound(id.clone()))?;
            self.build_locked(&record)
        })
    }

    /// Build the payload, then verify a holder's proof against its
    /// commitment and id.
    pub fn verify_document_proof(
        &self,
        raw_id: &str,
        submission: &ProofSubmission,
    ) -> DocSealResult<Verdict> {
        let report = self.build_payload(raw_id)?;
        let payload = &report.payload;
        let context = submission.context.as_deref().unwrap_or("");

        if verify_proof(&payload.zk_commitment, &payload.id, &submission.proof, context) {
            Ok(Verdict::Valid {
                document_id: payload.id.clone(),
                verified_at: self.clock.now().trunc_subsecs(0),
            })
        } else {
            Ok(Verdict::Invalid)
        }
    }

    fn build_locked(&self, record: &DocumentRecord) -> DocSealResult<BuildReport> {
        let (payload, patch) = self.assemble(record)?;
        let healed = patch.field_names();

        let persistence = if patch.is_empty() {
            PersistenceOutcome::Unchanged
        } else {
            tracing::info!(document_id = %record.id, fields = ?healed, "healing verification payload");
            match retry_sync(&self.config.retry, "persist_payload", || {
                self.store.put(&record.id, &patch)
            }) {
                Ok(_) => PersistenceOutcome::Persisted {
                    fields: healed.clone(),
                },
                Err(exhausted) => {
                    tracing::warn!(
                        document_id = %record.id,
                        attempts = exhausted.attempts,
                        error = %exhausted.last_error,
                        "could not persist verification payload, serving computed payload"
                    );
                    PersistenceOutcome::Failed {
                        attempts: exhausted.attempts,
                        error: exhausted.last_error.to_string(),
                    }
                }
            }
        };

        Ok(BuildReport {
            payload,
            healed,
            persistence,
        })
    }

    /// Compute the payload and the patch that would bring the record in
    /// line with it. Touches no state.
    fn assemble(
        &self,
        record: &DocumentRecord,
    ) -> DocSealResult<(VerificationPayload, DocumentPatch)> {
        let zk_commitment = non_empty(&record.zk_commitment).ok_or_else(|| {
            DocSealError::validation("document does not have a zero-knowledge commitment")
        })?;

        let mut patch = DocumentPatch::default();

        let issued_at = match record.timestamp {
            Some(ts) => ts,
            None => {
                let now = self.clock.now().trunc_subsecs(0);
                patch.timestamp = Some(now);
                now
            }
        };

        let normalization_strategy = match non_empty(&record.normalization_strategy) {
            Some(strategy) => strategy.to_string(),
            None => {
                let strategy = self.config.normalization_strategy.clone();
                patch.normalization_strategy = Some(strategy.clone());
                strategy
            }
        };

        let checksum = match non_empty(&record.checksum) {
            Some(stored) => stored.to_string(),
            None => {
                let fresh = checksum(&record.id, zk_commitment, &record.file_hash);
                patch.checksum = Some(fresh.clone());
                fresh
            }
        };

        let fields = SignableFields {
            checksum,
            file_hash: record.file_hash.clone(),
            id: record.id.clone(),
            issued_at: isoformat_utc(&issued_at),
            normalization_strategy,
            zk_commitment: zk_commitment.to_string(),
        };

        let stored_signature =
            non_empty(&record.signature).filter(|sig| self.signer.verify(&fields, sig));
        let (signature, resigned) = match stored_signature {
            Some(sig) => (sig.to_string(), false),
            None => {
                let sig = self.signer.sign(&fields)?;
                patch.signature = Some(sig.clone());
                (sig, true)
            }
        };
        let signed = SignedPayload::new(fields, signature);

        let stored_artifacts = match (non_empty(&record.qr_payload), non_empty(&record.qr_png)) {
            (Some(qr_payload), Some(qr_png)) if !resigned && encodes(qr_payload, &signed) => {
                Some((qr_payload.to_string(), qr_png.to_string()))
            }
            _ => None,
        };
        let (qr_payload, qr_png) = match stored_artifacts {
            Some(artifacts) => artifacts,
            None => {
                let qr_payload = encode(&signed)?;
                let qr_png = render_code_base64(&qr_payload)?;
                patch.qr_payload = Some(qr_payload.clone());
                patch.qr_png = Some(qr_png.clone());
                (qr_payload, qr_png)
            }
        };

        Ok((VerificationPayload::new(signed, qr_payload, qr_png), patch))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn encodes(qr_payload: &str, signed: &SignedPayload) -> bool {
    match decode(qr_payload) {
        Ok(decoded) => decoded == *signed,
        Err(e) => {
            tracing::debug!(error = %e, "stored qr_payload does not decode");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
