//! Reference regulations
//!
//! Each module appends one regulation and its clauses to a
//! [`CatalogBuilder`]. Adding a regulation means adding a module here and
//! chaining it in [`reference_catalog`]; the evaluator and scanner are
//! untouched.

pub mod gdpr;
pub mod hipaa;

use crate::catalog::{Catalog, CatalogBuilder, CatalogError};

/// Version tag of the built-in catalog
pub const REFERENCE_CATALOG_VERSION: &str = "2024.1";

/// Builder preloaded with the reference regulations, for callers that
/// extend the catalog with their own clauses before building.
pub fn reference_builder() -> CatalogBuilder {
    let builder = Catalog::builder(REFERENCE_CATALOG_VERSION);
    let builder = gdpr::register(builder);
    hipaa::register(builder)
}

/// The built-in GDPR + HIPAA catalog
pub fn reference_catalog() -> Result<Catalog, CatalogError> {
    reference_builder().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::Predicate;

    #[test]
    fn test_reference_catalog_builds() {
        let catalog = reference_catalog().unwrap();
        assert_eq!(catalog.version(), REFERENCE_CATALOG_VERSION);
        assert_eq!(catalog.clause_count(), 6);

        let names: Vec<_> = catalog.regulations().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["GDPR", "HIPAA"]);
    }

    #[test]
    fn test_reference_clause_order() {
        let catalog = reference_catalog().unwrap();
        let ids: Vec<_> = catalog.entries().map(|(_, c)| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "GDPR-Article-5",
                "GDPR-Article-6",
                "GDPR-Article-7",
                "HIPAA-Privacy",
                "HIPAA-Security",
                "HIPAA-Breach",
            ]
        );
    }

    #[test]
    fn test_reference_builder_is_extensible() {
        let catalog = reference_builder()
            .regulation("CCPA")
            .clause(
                "CCPA-Opt-Out",
                "Right to opt out of sale",
                Predicate::any_of(["do not sell", "opt out", "opt-out"]),
                "Provide a \"Do Not Sell My Personal Information\" mechanism.",
            )
            .build()
            .unwrap();
        assert_eq!(catalog.clause_count(), 7);
    }

    #[test]
    fn test_extension_cannot_reuse_reference_ids() {
        let err = reference_builder()
            .regulation("Internal")
            .clause("HIPAA-Audit", "dup", Predicate::contains("audit"), "fix")
            .clause("GDPR-Article-5", "dup", Predicate::contains("x"), "fix")
            .build()
            .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateClauseId("GDPR-Article-5".to_string()));
    }
}
