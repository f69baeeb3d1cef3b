//! # Documents
//!
//! Document ids, lookup normalization and the ingestion pipeline.
//!
//! Ids look like `INV-1234-5678`. Humans retype them from paper, so lookups
//! are forgiving: an id that does not match exactly is retried with every
//! character outside `[A-Za-z0-9-]` stripped and the rest upper-cased.

pub mod ingest;

use rand::Rng;

use crate::config::{DOCUMENT_ID_GROUP_DIGITS, DOCUMENT_ID_PREFIX, MAX_DOCUMENT_ID_LENGTH};
use crate::error::{DocSealError, DocSealResult};

pub use ingest::{human_size, Ingestor};

/// Clean a user-supplied id for the fallback lookup.
///
/// ```
/// use docseal_protocol::document::normalize_document_id;
///
/// assert_eq!(normalize_document_id(" inv-1234-5678 ").unwrap(), "INV-1234-5678");
/// assert!(normalize_document_id("  ").is_err());
/// ```
pub fn normalize_document_id(raw: &str) -> DocSealResult<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if cleaned.is_empty() {
        return Err(DocSealError::validation("document id is empty"));
    }
    // `cleaned` is pure ASCII, so its byte length is its character count.
    if cleaned.len() > MAX_DOCUMENT_ID_LENGTH {
        return Err(DocSealError::validation(format!(
            "document id longer than {MAX_DOCUMENT_ID_LENGTH} characters"
        )));
    }
    Ok(cleaned)
}

/// A fresh random id, `INV-dddd-dddd`.
pub fn generate_document_id<R: Rng>(rng: &mut R) -> String {
    let mut group = || {
        (0..DOCUMENT_ID_GROUP_DIGITS)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect::<String>()
    };
    let first = group();
    let second = group();
    format!("{DOCUMENT_ID_PREFIX}-{first}-{second}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn normalization_strips_and_uppercases() {
        assert_eq!(normalize_document_id("inv 1234-5678").unwrap(), "INV1234-5678");
        assert_eq!(normalize_document_id("INV-1234-5678").unwrap(), "INV-1234-5678");
        assert_eq!(normalize_document_id("inv_1234/5678!").unwrap(), "INV12345678");
    }

    #[test]
    fn empty_or_overlong_ids_are_validation_errors() {
        assert!(matches!(
            normalize_document_id("!!!"),
            Err(DocSealError::Validation(_))
        ));
        assert!(matches!(
            normalize_document_id(""),
            Err(DocSealError::Validation(_))
        ));
        let long = "A".repeat(MAX_DOCUMENT_ID_LENGTH + 1);
        assert!(matches!(
            normalize_document_id(&long),
            Err(DocSealError::Validation(_))
        ));
        assert!(normalize_document_id(&"A".repeat(MAX_DOCUMENT_ID_LENGTH)).is_ok());
    }

    #[test]
    fn length_limit_applies_after_cleaning() {
        let padded = format!("INV-1234-5678{}", " ".repeat(60));
        assert_eq!(normalize_document_id(&padded).unwrap(), "INV-1234-5678");

        let accented = format!("{}INV-1234-5678", "é".repeat(40));
        assert_eq!(normalize_document_id(&accented).unwrap(), "INV-1234-5678");

        let noisy_long = format!("{}!", "A".repeat(MAX_DOCUMENT_ID_LENGTH + 1));
        assert!(matches!(
            normalize_document_id(&noisy_long),
            Err(DocSealError::Validation(_))
        ));
    }

    #[test]
    fn generated_ids_have_the_expected_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let id = generate_document_id(&mut rng);
            let parts: Vec<&str> = id.split('-').collect();
            assert_eq!(parts.len(), 3, "{id}");
            assert_eq!(parts[0], "INV");
            assert!(parts[1..]
                .iter()
                .all(|p| p.len() == 4 && p.chars().all(|c| c.is_ascii_digit())));
            assert_eq!(normalize_document_id(&id).unwrap(), id);
        }
    }
}
