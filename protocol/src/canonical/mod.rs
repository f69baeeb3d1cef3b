//! # Content Canonicalizer
//!
//! Turns raw document bytes into the [`ContentDigest`] that everything else
//! commits to:
//!
//! ```text
//! bytes ──extract──► text ──canonicalize──► canonical text ──SHA-256──► digest
//! ```
//!
//! ## Architecture
//!
//! ```text
//! extract.rs    — media types and the TextExtractor contract
//! normalize.rs  — canonicalize(): NFKC, lowercase, whitespace collapse, trim
//! digest.rs     — ContentDigest and digest()
//! ```
//!
//! The whole pipeline is pure. Extraction failures degrade to empty text,
//! and empty canonical text has no digest, so a document we cannot read is
//! stored without a commitment instead of being rejected at upload time.

pub mod digest;
pub mod extract;
pub mod normalize;

pub use digest::{digest, ContentDigest};
pub use extract::{DefaultExtractor, MediaType, TextExtractor};
pub use normalize::canonicalize;

/// Run the full pipeline: extract, canonicalize, digest.
///
/// Returns `None` when no text survives canonicalization.
pub fn content_digest(
    extractor: &dyn TextExtractor,
    bytes: &[u8],
    media_type: &MediaType,
) -> Option<ContentDigest> {
    let text = extractor.extract(bytes, media_type);
    digest(&canonicalize(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_pipeline_matches_manual_steps() {
        let raw = b"Invoice  Total:\n100.00 USD\n";
        let via_pipeline = content_digest(&DefaultExtractor, raw, &MediaType::PlainText)
            .expect("text has content");

        let manual = digest("invoice total: 100.00 usd").expect("non-empty");
        assert_eq!(via_pipeline, manual);
    }

    #[test]
    fn unreadable_document_has_no_digest() {
        let raw = [0x89, b'P', b'N', b'G', 0x0d, 0x0a];
        let image = MediaType::from_mime("image/png");
        assert!(content_digest(&DefaultExtractor, &raw, &image).is_none());
    }
}
