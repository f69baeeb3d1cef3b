//! # Storage Module
//!
//! The document store sits behind a small synchronous trait so the core
//! never picks a persistence engine. Two adapters ship with the crate:
//!
//! ```text
//! record.rs  — DocumentRecord and the partial-update DocumentPatch
//! memory.rs  — MemoryStore, a DashMap for tests and --in-memory nodes
//! db.rs      — SledStore, sled tree of bincode-encoded records
//! ```
//!
//! ## Contract
//!
//! - `put` is an atomic read-modify-write of the named fields only. A
//!   concurrent writer touching other fields is never clobbered.
//! - `put` on an unknown id is [`StoreError::NotFound`]; it never creates.
//! - `insert` refuses to overwrite an existing id.
//!
//! Stores are shared as `Arc<dyn DocumentStore>`; every method takes `&self`.

pub mod db;
pub mod memory;
pub mod record;

use thiserror::Error;

pub use db::SledStore;
pub use memory::MemoryStore;
pub use record::{DocumentPatch, DocumentRecord};

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors raised by a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document already exists: {0}")]
    AlreadyExists(String),

    /// The backend refused the operation; retrying may succeed.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// DocumentStore
// ---------------------------------------------------------------------------

/// Where document records live.
pub trait DocumentStore: Send + Sync {
    /// Fetch a record by exact id.
    fn get(&self, id: &str) -> StoreResult<Option<DocumentRecord>>;

    /// Store a new record. Fails with [`StoreError::AlreadyExists`] if the
    /// id is taken.
    fn insert(&self, record: DocumentRecord) -> StoreResult<()>;

    /// Atomically apply `patch` to the record with this id and return the
    /// updated record.
    fn put(&self, id: &str, patch: &DocumentPatch) -> StoreResult<DocumentRecord>;
}
