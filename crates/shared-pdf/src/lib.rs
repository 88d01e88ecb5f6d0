//! Shared document text extraction
//!
//! Turns uploaded document bytes into plain text for the compliance engine.
//! Two kinds are supported: UTF-8 plain text and PDF.

pub mod extract;
#[cfg(any(test, feature = "testing"))]
pub mod fixtures;

pub use extract::{extract_text, DocumentKind, ExtractionError, MAX_DOCUMENT_BYTES};
