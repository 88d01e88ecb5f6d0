//! Text normalization for keyword matching
//!
//! Extracted document text is case-folded and its whitespace runs collapsed
//! to a single space, so a phrase broken across lines by PDF extraction
//! ("breach\nnotification") still matches the catalog keyword. Zero-width
//! characters that extraction sometimes leaves inside words are dropped.
//! Nothing else is touched: no stemming, no punctuation stripping.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Document text prepared for case-insensitive substring matching.
///
/// Only [`normalize`] produces values of this type, so every predicate sees
/// text folded the same way as its keywords.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Substring test against an already-normalized keyword
    pub fn contains(&self, keyword: &str) -> bool {
        self.0.contains(keyword)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize raw extracted text. Total: never fails, empty in, empty out.
pub fn normalize(raw: &str) -> NormalizedText {
    let folded: String = raw
        .chars()
        .filter(|c| !is_zero_width(*c))
        .flat_map(char::to_lowercase)
        .collect();

    NormalizedText(WHITESPACE_RUN.replace_all(&folded, " ").into_owned())
}

fn is_zero_width(c: char) -> bool {
    matches!(
        c,
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{00AD}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases() {
        assert_eq!(normalize("PHI and Consent").as_str(), "phi and consent");
    }

    #[test]
    fn test_empty_input() {
        let text = normalize("");
        assert!(text.is_empty());
        assert!(!text.contains("consent"));
    }

    #[test]
    fn test_collapses_line_breaks_inside_phrases() {
        let text = normalize("Breach\r\n  Notification procedures");
        assert!(text.contains("breach notification"));
    }

    #[test]
    fn test_drops_zero_width_characters() {
        let text = normalize("en\u{200B}cryption");
        assert!(text.contains("encryption"));
    }

    #[test]
    fn test_keeps_punctuation_and_word_forms() {
        let text = normalize("Consent can be WITHDRAWN, at any time.");
        assert_eq!(text.as_str(), "consent can be withdrawn, at any time.");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize("Legal  Obligation\tand Vital Interests");
        let twice = normalize(once.as_str());
        assert_eq!(once, twice);
    }
}
