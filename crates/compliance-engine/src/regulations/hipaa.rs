//! Health Insurance Portability and Accountability Act (45 CFR Parts 160, 164)

use crate::catalog::CatalogBuilder;
use crate::predicate::Predicate;

pub const REGULATION: &str = "HIPAA";

pub fn register(builder: CatalogBuilder) -> CatalogBuilder {
    builder
        .regulation(REGULATION)
        // 45 CFR 164 Subpart E
        .clause(
            "HIPAA-Privacy",
            "Privacy Rule: protected health information",
            Predicate::any_of(["protected health information", "phi"]),
            "Describe how protected health information (PHI) is used and disclosed, and limit \
             uses to the minimum necessary.",
        )
        // 45 CFR 164 Subpart C
        .clause(
            "HIPAA-Security",
            "Security Rule: safeguards",
            Predicate::any_of(["encryption", "access control", "audit"]),
            "Document technical safeguards for electronic PHI, such as encryption, access \
             controls, and audit controls.",
        )
        // 45 CFR 164 Subpart D
        .clause(
            "HIPAA-Breach",
            "Breach Notification Rule",
            Predicate::contains("breach notification")
                .or(Predicate::all_of(["breach", "notify"])),
            "Add a breach notification procedure covering how affected individuals, HHS, and \
             where required the media are notified after a breach of unsecured PHI.",
        )
}
