//! In-memory document store.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{DocumentPatch, DocumentRecord, DocumentStore, StoreError, StoreResult};

/// A [`DocumentStore`] backed by a `DashMap`. Patches are applied while
/// holding the entry's shard lock, so concurrent patches never interleave.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: DashMap<String, DocumentRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, id: &str) -> StoreResult<Option<DocumentRecord>> {
        Ok(self.documents.get(id).map(|r| r.value().clone()))
    }

    fn insert(&self, record: DocumentRecord) -> StoreResult<()> {
        match self.documents.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(record.id)),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    fn put(&self, id: &str, patch: &DocumentPatch) -> StoreResult<DocumentRecord> {
        let mut entry = self
            .documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply_to(entry.value_mut());
        Ok(entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::record::tests::sample_record;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn insert_then_get() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.insert(sample_record("INV-1")).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("INV-1").unwrap().unwrap().id, "INV-1");
        assert!(store.get("INV-2").unwrap().is_none());
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = MemoryStore::new();
        store.insert(sample_record("INV-1")).unwrap();
        let err = store.insert(sample_record("INV-1")).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(id) if id == "INV-1"));
    }

    #[test]
    fn put_on_missing_id_is_not_found() {
        let store = MemoryStore::new();
        let patch = DocumentPatch {
            checksum: Some("X".into()),
            ..Default::default()
        };
        assert!(matches!(store.put("nope", &patch), Err(StoreError::NotFound(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_patches_to_different_fields_both_land() {
        let store = Arc::new(MemoryStore::new());
        store.insert(sample_record("INV-1")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let patch = if i % 2 == 0 {
                        DocumentPatch {
                            checksum: Some("CHECK".into()),
                            ..Default::default()
                        }
                    } else {
                        DocumentPatch {
                            qr_png: Some("PNG".into()),
                            ..Default::default()
                        }
                    };
                    store.put("INV-1", &patch).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let record = store.get("INV-1").unwrap().unwrap();
        assert_eq!(record.checksum.as_deref(), Some("CHECK"));
        assert_eq!(record.qr_png.as_deref(), Some("PNG"));
    }
}
