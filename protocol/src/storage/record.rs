//! Stored document records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document as the store keeps it.
///
/// The ingestion facts (`file_hash`, `normalized_text_hash`,
/// `zk_commitment`) are written once and never patched. The payload fields
/// below them are filled lazily by the verification service.
///
/// Every field is always serialized: records are bincode-encoded on disk,
/// which is positional and cannot skip fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub name: String,
    pub original_filename: String,
    pub file_hash: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub status: String,
    /// Human-readable size, e.g. `12.5 KB`.
    pub size: String,
    pub normalization_strategy: Option<String>,
    pub normalized_text_hash: Option<String>,
    pub zk_commitment: Option<String>,

    // -- Lazily computed payload fields ------------------------------------
    pub checksum: Option<String>,
    pub signature: Option<String>,
    pub qr_payload: Option<String>,
    pub qr_png: Option<String>,
}

/// A partial update. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentPatch {
    pub normalization_strategy: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub checksum: Option<String>,
    pub signature: Option<String>,
    pub qr_payload: Option<String>,
    pub qr_png: Option<String>,
}

impl DocumentPatch {
    /// True if applying this patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.normalization_strategy.is_none()
            && self.timestamp.is_none()
            && self.checksum.is_none()
            && self.signature.is_none()
            && self.qr_payload.is_none()
            && self.qr_png.is_none()
    }

    /// Names of the fields this patch sets, for logging.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.normalization_strategy.is_some() {
            names.push("normalization_strategy");
        }
        if self.timestamp.is_some() {
            names.push("timestamp");
        }
        if self.checksum.is_some() {
            names.push("checksum");
        }
        if self.signature.is_some() {
            names.push("signature");
        }
        if self.qr_payload.is_some() {
            names.push("qr_payload");
        }
        if self.qr_png.is_some() {
            names.push("qr_png");
        }
        names
    }

    /// Write the set fields into `record`.
    pub fn apply_to(&self, record: &mut DocumentRecord) {
        if let Some(v) = &self.normalization_strategy {
            record.normalization_strategy = Some(v.clone());
        }
        if let Some(v) = self.timestamp {
            record.timestamp = Some(v);
        }
        if let Some(v) = &self.checksum {
            record.checksum = Some(v.clone());
        }
        if let Some(v) = &self.signature {
            record.signature = Some(v.clone());
        }
        if let Some(v) = &self.qr_payload {
            record.qr_payload = Some(v.clone());
        }
        if let Some(v) = &self.qr_png {
            record.qr_png = Some(v.clone());
        }
    }
}
