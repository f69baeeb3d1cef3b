//! Text canonicalization.
//!
//! Rules, applied in this order:
//!
//! 1. Unicode NFKC normalization (`ﬁ` → `fi`, full-width `Ａ` → `A`, `①` → `1`)
//! 2. Full lowercase fold
//! 3. Every run of whitespace, line breaks included, becomes one space
//! 4. Leading and trailing whitespace is trimmed
//!
//! The rule set is identified on stored documents by
//! [`crate::config::NORMALIZATION_STRATEGY`]. Changing any rule changes
//! every digest, so a new rule set needs a new strategy id.

use unicode_normalization::UnicodeNormalization;

/// Canonicalize extracted document text.
///
/// Deterministic, and idempotent on its own output.
pub fn canonicalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let folded = raw.nfkc().collect::<String>().to_lowercase();

    let mut out = String::with_capacity(folded.len());
    for word in folded.split(is_separator).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Unicode `White_Space` plus the ASCII information separators (U+001C to
/// U+001F), which PDF extractors emit between text runs.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}
