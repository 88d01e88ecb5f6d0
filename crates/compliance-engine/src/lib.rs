//! Document compliance engine
//!
//! Checks extracted document text against a catalog of regulatory clauses
//! and reports the clauses the text does not satisfy, with remediation
//! guidance. Matching is lexical and deterministic:
//!
//! raw text → [`normalize`] → every clause in catalog order → [`evaluate`]
//! → unsatisfied clauses become [`Finding`]s → [`ScanResult`]
//!
//! The catalog is built once and handed to the engine explicitly; the engine
//! keeps no other state, so a scan is a pure function of (catalog, text).

pub mod catalog;
pub mod evaluator;
pub mod normalize;
pub mod predicate;
pub mod regulations;
pub mod scanner;

use std::sync::Arc;

pub use catalog::{Catalog, CatalogBuilder, CatalogError, Clause, Regulation};
pub use evaluator::evaluate;
pub use normalize::{normalize, NormalizedText};
pub use predicate::{CompiledPatterns, EvaluationError, Predicate};
pub use regulations::{reference_builder, reference_catalog, REFERENCE_CATALOG_VERSION};
pub use scanner::{scan, scan_parallel};
pub use shared_types::{ClauseFault, Finding, ScanResult};

/// ComplianceEngine entry point
///
/// Cheap to clone; clones share the same catalog.
#[derive(Debug, Clone)]
pub struct ComplianceEngine {
    catalog: Arc<Catalog>,
}

impl ComplianceEngine {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    /// Engine over the built-in GDPR + HIPAA catalog
    pub fn with_reference_catalog() -> Result<Self, CatalogError> {
        reference_catalog().map(Self::new)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Scan extracted document text
    pub fn scan(&self, text: &str) -> ScanResult {
        scanner::scan(&self.catalog, text)
    }

    /// Scan with clauses evaluated concurrently; same result as [`Self::scan`]
    pub fn scan_parallel(&self, text: &str) -> ScanResult {
        scanner::scan_parallel(&self.catalog, text)
    }
}
