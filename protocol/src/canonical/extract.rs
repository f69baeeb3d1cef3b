//! Text extraction.
//!
//! The extractor contract is simple and unforgiving: given bytes and a media
//! type, return text. Never an error. An unsupported format or a corrupt
//! file yields an empty string and a warning in the logs, because ingestion
//! must not abort just because we could not read the document.

use std::fmt;
use std::path::Path;

/// Media types the default extractor distinguishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaType {
    /// `application/pdf`
    Pdf,
    /// `text/plain` and friends.
    PlainText,
    /// Anything else, kept verbatim for logging.
    Other(String),
}

impl MediaType {
    /// Parse a MIME type, ignoring parameters (`; charset=utf-8`) and case.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/pdf" => MediaType::Pdf,
            "text/plain" | "text/markdown" | "text/csv" => MediaType::PlainText,
            _ => MediaType::Other(essence),
        }
    }

    /// Guess from a file name's extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => MediaType::Pdf,
            "txt" | "md" | "csv" => MediaType::PlainText,
            other => MediaType::Other(format!(".{other}")),
        }
    }

    /// Canonical MIME string.
    pub fn as_mime(&self) -> &str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::PlainText => "text/plain",
            MediaType::Other(s) => s,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_mime())
    }
}

/// Pulls text out of a document. Implementations must not panic and must
/// not fail: unreadable input produces an empty string.
pub trait TextExtractor: Send + Sync {
    /// Extract the document's text.
    fn extract(&self, bytes: &[u8], media_type: &MediaType) -> String;
}

/// Extractor for PDFs (with the `pdf` feature) and UTF-8 plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExtractor;

impl TextExtractor for DefaultExtractor {
    fn extract(&self, bytes: &[u8], media_type: &MediaType) -> String {
        match media_type {
            MediaType::PlainText => String::from_utf8_lossy(bytes).into_owned(),
            MediaType::Pdf => extract_pdf(bytes),
            MediaType::Other(kind) => {
                tracing::warn!(media_type = %kind, "no extractor configured, using empty text");
                String::new()
            }
        }
    }
}

#[cfg(feature = "pdf")]
fn extract_pdf(bytes: &[u8]) -> String {
    // pdf-extract panics on some malformed inputs instead of erroring.
    let outcome = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));
    match outcome {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "failed to extract text from pdf");
            String::new()
        }
        Err(_) => {
            tracing::warn!("pdf extractor panicked, using empty text");
            String::new()
        }
    }
}

#[cfg(not(feature = "pdf"))]
fn extract_pdf(_bytes: &[u8]) -> String {
    tracing::warn!("built without pdf support, using empty text");
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_parsing_ignores_parameters_and_case() {
        assert_eq!(MediaType::from_mime("Application/PDF"), MediaType::Pdf);
        assert_eq!(
            MediaType::from_mime("text/plain; charset=utf-8"),
            MediaType::PlainText
        );
        assert_eq!(
            MediaType::from_mime("image/png"),
            MediaType::Other("image/png".into())
        );
    }

    #[test]
    fn path_guessing() {
        assert_eq!(MediaType::from_path(Path::new("a/B.PDF")), MediaType::Pdf);
        assert_eq!(MediaType::from_path(Path::new("notes.txt")), MediaType::PlainText);
        assert_eq!(
            MediaType::from_path(Path::new("photo.jpeg")),
            MediaType::Other(".jpeg".into())
        );
    }

    #[test]
    fn plain_text_is_decoded_lossily() {
        let text = DefaultExtractor.extract(b"caf\xc3\xa9 \xff", &MediaType::PlainText);
        assert_eq!(text, "café \u{FFFD}");
    }

    #[test]
    fn unsupported_type_yields_empty_text() {
        let text = DefaultExtractor.extract(b"GIF89a", &MediaType::from_mime("image/gif"));
        assert!(text.is_empty());
    }

    #[test]
    fn garbage_pdf_yields_empty_text() {
        let text = DefaultExtractor.extract(b"definitely not a pdf", &MediaType::Pdf);
        assert!(text.is_empty());
    }
}
