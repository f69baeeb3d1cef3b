//! # SledStore — Persistent Document Store
//!
//! Documents live in a single sled tree:
//!
//! | Tree        | Key              | Value                     |
//! |-------------|------------------|---------------------------|
//! | `documents` | document id UTF-8 | `bincode(DocumentRecord)` |
//!
//! ## Atomicity
//!
//! `insert` is a compare-and-swap against an empty slot, so two ingestions
//! racing on the same id cannot both win. `put` goes through sled's
//! `update_and_fetch`, which retries the read-modify-write until its CAS
//! succeeds: a patch always applies to the latest record and never
//! overwrites fields another writer changed in between.

use std::path::Path;

use sled::{Db, Tree};

use super::{DocumentPatch, DocumentRecord, DocumentStore, StoreError, StoreResult};

const DOCUMENTS_TREE: &str = "documents";

/// A [`DocumentStore`] persisted with sled.
///
/// Clones share the same underlying database.
#[derive(Debug, Clone)]
pub struct SledStore {
    db: Db,
    documents: Tree,
}

impl SledStore {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// A throwaway database removed when the last handle drops.
    pub fn open_temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> StoreResult<Self> {
        let documents = db.open_tree(DOCUMENTS_TREE)?;
        Ok(Self { db, documents })
    }

    /// Number of stored documents.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Force pending writes to disk.
    pub fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

fn encode(record: &DocumentRecord) -> StoreResult<Vec<u8>> {
    bincode::serialize(record).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode(bytes: &[u8]) -> StoreResult<DocumentRecord> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

impl DocumentStore for SledStore {
    fn get(&self, id: &str) -> StoreResult<Option<DocumentRecord>> {
        match self.documents.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn insert(&self, record: DocumentRecord) -> StoreResult<()> {
        let bytes = encode(&record)?;
        let swapped =
            self.documents
                .compare_and_swap(record.id.as_bytes(), None as Option<&[u8]>, Some(bytes))?;
        if swapped.is_err() {
            return Err(StoreError::AlreadyExists(record.id));
        }
        self.db.flush()?;
        Ok(())
    }

    fn put(&self, id: &str, patch: &DocumentPatch) -> StoreResult<DocumentRecord> {
        let mut failure: Option<StoreError> = None;

        let updated = self.documents.update_and_fetch(id.as_bytes(), |current| {
            let current = current?;
            let mut record = match decode(current) {
                Ok(record) => record,
                Err(e) => {
                    failure = Some(e);
                    return Some(current.to_vec());
                }
            };
            patch.apply_to(&mut record);
            match encode(&record) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    failure = Some(e);
                    Some(current.to_vec())
                }
            }
        })?;

        if let Some(e) = failure {
            return Err(e);
        }
        let bytes = updated.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.db.flush()?;
        decode(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::record::tests::sample_record;

    #[test]
    fn open_temporary_database() {
        let store = SledStore::open_temporary().expect("should create temp db");
        assert_eq!(store.document_count(), 0);
    }

    #[test]
    fn insert_get_and_patch() {
        let store = SledStore::open_temporary().unwrap();
        store.insert(sample_record("INV-1")).unwrap();

        let patch = DocumentPatch {
            signature: Some("sig".into()),
            ..Default::default()
        };
        let updated = store.put("INV-1", &patch).unwrap();
        assert_eq!(updated.signature.as_deref(), Some("sig"));

        let fetched = store.get("INV-1").unwrap().unwrap();
        assert_eq!(fetched, updated);
        assert_eq!(fetched.zk_commitment, sample_record("INV-1").zk_commitment);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = SledStore::open_temporary().unwrap();
        store.insert(sample_record("INV-1")).unwrap();
        let mut other = sample_record("INV-1");
        other.name = "other.txt".into();
        assert!(matches!(
            store.insert(other),
            Err(StoreError::AlreadyExists(_))
        ));
        assert_eq!(store.get("INV-1").unwrap().unwrap().name, "invoice.txt");
    }

    #[test]
    fn put_on_missing_id_is_not_found_and_creates_nothing() {
        let store = SledStore::open_temporary().unwrap();
        let patch = DocumentPatch {
            checksum: Some("X".into()),
            ..Default::default()
        };
        assert!(matches!(store.put("nope", &patch), Err(StoreError::NotFound(_))));
        assert_eq!(store.document_count(), 0);
    }

    #[test]
    fn corrupt_record_is_a_serialization_error() {
        let store = SledStore::open_temporary().unwrap();
        store.documents.insert("INV-BAD", &b"\xff"[..]).unwrap();
        assert!(matches!(store.get("INV-BAD"), Err(StoreError::Serialization(_))));

        let patch = DocumentPatch {
            checksum: Some("X".into()),
            ..Default::default()
        };
        assert!(matches!(
            store.put("INV-BAD", &patch),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = SledStore::open(dir.path()).unwrap();
            store.insert(sample_record("INV-1")).unwrap();
            store
                .put(
                    "INV-1",
                    &DocumentPatch {
                        checksum: Some("ABCDEF123456".into()),
                        ..Default::default()
                    },
                )
                .unwrap();
        }
        let store = SledStore::open(dir.path()).unwrap();
        let record = store.get("INV-1").unwrap().unwrap();
        assert_eq!(record.checksum.as_deref(), Some("ABCDEF123456"));
    }
}
