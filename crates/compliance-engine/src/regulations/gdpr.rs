//! EU General Data Protection Regulation (Regulation (EU) 2016/679)

use crate::catalog::CatalogBuilder;
use crate::predicate::Predicate;

pub const REGULATION: &str = "GDPR";

/// Lawful bases listed in Art. 6(1)(a)-(f)
pub const LAWFUL_BASES: &[&str] = &[
    "consent",
    "contract",
    "legal obligation",
    "vital interests",
    "public task",
    "legitimate interests",
];

pub fn register(builder: CatalogBuilder) -> CatalogBuilder {
    builder
        .regulation(REGULATION)
        // Art. 5(1)(b)-(c): purpose limitation and data minimisation
        .clause(
            "GDPR-Article-5",
            "Principles relating to processing of personal data",
            Predicate::contains("purpose").and(Predicate::any_of(["minimization", "minimize"])),
            "State the specific purposes for which personal data is collected and commit to \
             collecting only the data that is adequate, relevant and limited to those purposes \
             (data minimization).",
        )
        .clause(
            "GDPR-Article-6",
            "Lawfulness of processing",
            Predicate::any_of(LAWFUL_BASES.iter().copied()),
            "Identify the lawful basis for each processing activity: consent, contract, legal \
             obligation, vital interests, public task, or legitimate interests.",
        )
        .clause(
            "GDPR-Article-7",
            "Conditions for consent",
            Predicate::contains("consent").and(Predicate::any_of(["withdraw", "withdrawal"])),
            "Where processing relies on consent, explain how consent is recorded and that it can \
             be withdrawn at any time as easily as it was given.",
        )
}
