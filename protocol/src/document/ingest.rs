//! Document ingestion.
//!
//! ```text
//! bytes ──► file_hash (SHA-256 hex)
//!   │
//!   └──► extract ──► canonicalize ──► digest ──► commitment
//! ```
//!
//! Only the immutable facts are computed here. Checksum, signature and the
//! QR artifacts are left empty for the verification service to fill on the
//! first request.

use std::path::Path;
use std::sync::Arc;

use chrono::SubsecRound;
use rand::Rng;

use super::generate_document_id;
use crate::canonical::{canonicalize, digest, MediaType, TextExtractor};
use crate::clock::Clock;
use crate::config::{ProtocolConfig, DEFAULT_DOCUMENT_STATUS, DOCUMENT_ID_ATTEMPTS};
use crate::crypto::sha256_hex;
use crate::error::DocSealResult;
use crate::storage::{DocumentRecord, DocumentStore, StoreError};
use crate::zkp::derive_commitment;

/// Render a byte count the way the document list shows it.
///
/// ```
/// use docseal_protocol::document::human_size;
///
/// assert_eq!(human_size(512), "512 B");
/// assert_eq!(human_size(1536), "1.5 KB");
/// assert_eq!(human_size(3 * 1024 * 1024), "3.0 MB");
/// ```
pub fn human_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

/// Turns uploaded bytes into stored document records.
pub struct Ingestor {
    extractor: Arc<dyn TextExtractor>,
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    config: ProtocolConfig,
}

impl Ingestor {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        config: ProtocolConfig,
    ) -> Self {
        Self {
            extractor,
            store,
            clock,
            config,
        }
    }

    /// Ingest a document with a thread-local RNG for the id.
    pub fn ingest(
        &self,
        bytes: &[u8],
        media_type: &MediaType,
        original_filename: &str,
    ) -> DocSealResult<DocumentRecord> {
        self.ingest_with_rng(bytes, media_type, original_filename, &mut rand::thread_rng())
    }

    /// Ingest a document, drawing ids from `rng`.
    ///
    /// A document whose text cannot be extracted is still stored, without a
    /// commitment. It can be listed and fetched but never verified.
    pub fn ingest_with_rng<R: Rng>(
        &self,
        bytes: &[u8],
        media_type: &MediaType,
        original_filename: &str,
        rng: &mut R,
    ) -> DocSealResult<DocumentRecord> {
        let file_hash = sha256_hex(bytes);

        let text = canonicalize(&self.extractor.extract(bytes, media_type));
        let content_digest = digest(&text);
        let zk_commitment = content_digest.as_ref().map(|d| derive_commitment(d).to_hex());
        if zk_commitment.is_none() {
            tracing::warn!(
                filename = %original_filename,
                %media_type,
                "no text extracted, document will not be verifiable"
            );
        }

        let mut record = DocumentRecord {
            id: String::new(),
            name: String::new(),
            original_filename: original_filename.to_string(),
            file_hash,
            timestamp: Some(self.clock.now().trunc_subsecs(0)),
            status: DEFAULT_DOCUMENT_STATUS.to_string(),
            size: human_size(bytes.len() as u64),
            normalization_strategy: Some(self.config.normalization_strategy.clone()),
            normalized_text_hash: content_digest.map(|d| d.to_hex()),
            zk_commitment,
            checksum: None,
            signature: None,
            qr_payload: None,
            qr_png: None,
        };

        let extension = Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "pdf".to_string());

        let mut last_id = String::new();
        for _ in 0..DOCUMENT_ID_ATTEMPTS {
            let id = generate_document_id(rng);
            record.id = id.clone();
            record.name = format!("{id}.{extension}");
            match self.store.insert(record.clone()) {
                Ok(()) => {
                    tracing::info!(
                        document_id = %id,
                        size = %record.size,
                        committed = record.zk_commitment.is_some(),
                        "document ingested"
                    );
                    return Ok(record);
                }
                Err(StoreError::AlreadyExists(_)) => {
                    tracing::debug!(document_id = %id, "document id collision, retrying");
                    last_id = id;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::AlreadyExists(last_id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::DefaultExtractor;
    use crate::clock::FixedClock;
    use crate::error::DocSealError;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ingestor(store: Arc<MemoryStore>) -> Ingestor {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
        Ingestor::new(
            Arc::new(DefaultExtractor),
            store,
            Arc::new(clock),
            ProtocolConfig::default(),
        )
    }

    #[test]
    fn ingest_plain_text() {
        let store = Arc::new(MemoryStore::new());
        let bytes = b"Invoice TOTAL:\n 100.00   USD";
        let record = ingestor(store.clone())
            .ingest(bytes, &MediaType::PlainText, "invoice.txt")
            .unwrap();

        assert!(record.id.starts_with("INV-"));
        assert_eq!(record.name, format!("{}.txt", record.id));
        assert_eq!(record.file_hash, sha256_hex(bytes));
        assert_eq!(record.size, "28 B");
        assert_eq!(record.status, "active");

        let expected = digest("invoice total: 100.00 usd").unwrap();
        assert_eq!(record.normalized_text_hash, Some(expected.to_hex()));
        assert_eq!(
            record.zk_commitment,
            Some(derive_commitment(&expected).to_hex())
        );
        assert!(record.checksum.is_none() && record.signature.is_none());

        assert_eq!(store.get(&record.id).unwrap(), Some(record));
    }

    #[test]
    fn unreadable_document_is_stored_without_commitment() {
        let store = Arc::new(MemoryStore::new());
        let record = ingestor(store.clone())
            .ingest(b"\x00\x01binary", &MediaType::from_mime("image/png"), "scan")
            .unwrap();
        assert!(record.zk_commitment.is_none());
        assert!(record.normalized_text_hash.is_none());
        assert_eq!(record.name, format!("{}.pdf", record.id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn id_collision_draws_a_new_id() {
        let store = Arc::new(MemoryStore::new());
        let taken = generate_document_id(&mut StdRng::seed_from_u64(11));
        let mut squatter = crate::storage::record::tests::sample_record(&taken);
        squatter.name = "squatter".into();
        store.insert(squatter).unwrap();

        let record = ingestor(store.clone())
            .ingest_with_rng(b"hello", &MediaType::PlainText, "a.txt", &mut StdRng::seed_from_u64(11))
            .unwrap();
        assert_ne!(record.id, taken);
        assert_eq!(store.get(&taken).unwrap().unwrap().name, "squatter");
    }

    #[test]
    fn human_size_boundaries() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1024), "1.0 KB");
        assert_eq!(human_size(1024 * 1024 - 1), "1024.0 KB");
        assert_eq!(human_size(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
    }

    #[test]
    fn store_faults_propagate() {
        struct BrokenStore;
        impl DocumentStore for BrokenStore {
            fn get(&self, _: &str) -> crate::storage::StoreResult<Option<DocumentRecord>> {
                Ok(None)
            }
            fn insert(&self, _: DocumentRecord) -> crate::storage::StoreResult<()> {
                Err(StoreError::Unavailable("disk full".into()))
            }
            fn put(
                &self,
                id: &str,
                _: &crate::storage::DocumentPatch,
            ) -> crate::storage::StoreResult<DocumentRecord> {
                Err(StoreError::NotFound(id.into()))
            }
        }

        let ingestor = Ingestor::new(
            Arc::new(DefaultExtractor),
            Arc::new(BrokenStore),
            Arc::new(crate::clock::SystemClock),
            ProtocolConfig::default(),
        );
        let err = ingestor
            .ingest(b"text", &MediaType::PlainText, "a.txt")
            .unwrap_err();
        assert!(matches!(err, DocSealError::Storage(StoreError::Unavailable(_))));
    }
}
