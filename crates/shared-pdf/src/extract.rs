//! Text extraction from uploaded documents
//!
//! | Kind | Detection | Extraction |
//! |------|-----------|------------|
//! | Plain text | `.txt` / `text/plain` | strict UTF-8 decode, returned as-is |
//! | PDF | `.pdf` / `application/pdf` | `pdf-extract`, text in page order |

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Upload size cap applied by callers before extraction (10 MiB)
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Extraction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Neither the file name nor the content type names a supported kind
    #[error("Unsupported file type '{0}'. Upload a .pdf or .txt file")]
    UnsupportedKind(String),

    /// Plain-text upload is not valid UTF-8
    #[error("Text file is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    /// PDF parsing failed
    #[error("PDF text extraction failed: {0}")]
    Parse(String),
}

impl ExtractionError {
    /// True when the uploader caused the failure (as opposed to a parser fault)
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ExtractionError::UnsupportedKind(_) | ExtractionError::InvalidEncoding(_)
        )
    }
}

/// Declared kind of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    PlainText,
    Pdf,
}

impl DocumentKind {
    /// Kind from a file name extension (case-insensitive)
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(DocumentKind::PlainText),
            "pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }

    /// Kind from a MIME type, ignoring parameters such as `charset`
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "text/plain" => Some(DocumentKind::PlainText),
            "application/pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }

    /// Resolve the kind of an upload: the file name wins, the content type is
    /// the fallback.
    pub fn detect(
        file_name: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<Self, ExtractionError> {
        file_name
            .and_then(Self::from_file_name)
            .or_else(|| content_type.and_then(Self::from_content_type))
            .ok_or_else(|| {
                ExtractionError::UnsupportedKind(
                    file_name
                        .or(content_type)
                        .unwrap_or("unknown")
                        .to_string(),
                )
            })
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentKind::PlainText => "text/plain",
            DocumentKind::Pdf => "application/pdf",
        }
    }
}

/// Extract the textual content of a document
pub fn extract_text(data: &[u8], kind: DocumentKind) -> Result<String, ExtractionError> {
    let text = match kind {
        DocumentKind::PlainText => std::str::from_utf8(data)
            .map(str::to_string)
            .map_err(|e| ExtractionError::InvalidEncoding(e.to_string()))?,
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(data)
            .map_err(|e| ExtractionError::Parse(e.to_string()))?,
    };

    debug!(
        kind = ?kind,
        bytes = data.len(),
        chars = text.len(),
        "Extracted document text"
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(DocumentKind::from_file_name("policy.txt"), Some(DocumentKind::PlainText));
        assert_eq!(DocumentKind::from_file_name("POLICY.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_file_name("archive.tar.pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_file_name("report.docx"), None);
        assert_eq!(DocumentKind::from_file_name("README"), None);
    }

    #[test]
    fn test_kind_from_content_type() {
        assert_eq!(
            DocumentKind::from_content_type("text/plain; charset=utf-8"),
            Some(DocumentKind::PlainText)
        );
        assert_eq!(
            DocumentKind::from_content_type("Application/PDF"),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(DocumentKind::from_content_type("image/png"), None);
    }

    #[test]
    fn test_detect_prefers_file_name() {
        let kind = DocumentKind::detect(Some("notes.txt"), Some("application/pdf")).unwrap();
        assert_eq!(kind, DocumentKind::PlainText);
    }

    #[test]
    fn test_detect_falls_back_to_content_type() {
        let kind = DocumentKind::detect(Some("upload"), Some("application/pdf")).unwrap();
        assert_eq!(kind, DocumentKind::Pdf);
    }

    #[test]
    fn test_detect_rejects_unknown() {
        let err = DocumentKind::detect(Some("slides.pptx"), Some("application/octet-stream"))
            .unwrap_err();
        assert_eq!(err, ExtractionError::UnsupportedKind("slides.pptx".to_string()));
        assert!(err.is_input_error());

        let err = DocumentKind::detect(None, None).unwrap_err();
        assert_eq!(err, ExtractionError::UnsupportedKind("unknown".to_string()));
    }

    #[test]
    fn test_plain_text_returned_as_is() {
        let text = extract_text("Consent can be withdrawn.\n".as_bytes(), DocumentKind::PlainText)
            .unwrap();
        assert_eq!(text, "Consent can be withdrawn.\n");
    }

    #[test]
    fn test_empty_plain_text() {
        assert_eq!(extract_text(b"", DocumentKind::PlainText).unwrap(), "");
    }

    #[test]
    fn test_invalid_utf8_is_input_error() {
        let err = extract_text(&[0x66, 0x6f, 0xff, 0xfe], DocumentKind::PlainText).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidEncoding(_)));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_corrupt_pdf_is_parse_error() {
        let err = extract_text(b"%PDF-1.4 this is not a real pdf", DocumentKind::Pdf).unwrap_err();
        assert!(matches!(err, ExtractionError::Parse(_)));
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_pdf_text_in_page_order() {
        let pdf = crate::fixtures::text_pdf(&[
            "First page states the purpose.",
            "Second page covers minimization.",
        ]);
        let text = extract_text(&pdf, DocumentKind::Pdf).unwrap();

        let first = text.find("purpose").expect("page one text extracted");
        let second = text.find("minimization").expect("page two text extracted");
        assert!(first < second, "pages out of order: {text:?}");
    }

    #[test]
    fn test_mime_type_round_trips_detection() {
        for kind in [DocumentKind::PlainText, DocumentKind::Pdf] {
            assert_eq!(DocumentKind::from_content_type(kind.mime_type()), Some(kind));
        }
    }

    proptest! {
        /// Property: any UTF-8 string extracts unchanged as plain text
        #[test]
        fn utf8_plain_text_is_identity(text in ".{0,200}") {
            let out = extract_text(text.as_bytes(), DocumentKind::PlainText).unwrap();
            prop_assert_eq!(out, text);
        }

        /// Property: unsupported extensions never resolve to a kind
        #[test]
        fn unsupported_extensions_rejected(stem in "[a-z]{1,10}", ext in "(doc|docx|rtf|png|jpg|html|csv)") {
            let name = format!("{}.{}", stem, ext);
            prop_assert!(DocumentKind::detect(Some(&name), None).is_err());
        }
    }
}
