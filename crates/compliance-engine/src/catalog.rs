//! Regulation catalog
//!
//! A catalog is an ordered list of regulations, each holding an ordered list
//! of clauses. It is assembled once through [`CatalogBuilder`], validated in
//! `build()`, and never mutated afterwards, so one instance can be shared
//! across request handlers without locking.
//!
//! ```
//! use compliance_engine::{Catalog, Predicate};
//!
//! let catalog = Catalog::builder("demo-1")
//!     .regulation("GDPR")
//!     .clause(
//!         "GDPR-Article-7",
//!         "Conditions for consent",
//!         Predicate::contains("consent").and(Predicate::any_of(["withdraw", "withdrawal"])),
//!         "Explain how consent can be withdrawn.",
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(catalog.clause_count(), 1);
//! ```

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::predicate::{CompiledPatterns, Predicate};

/// Catalog construction failures. These are authoring defects and surface
/// before any document is scanned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Duplicate clause id '{0}'")]
    DuplicateClauseId(String),

    #[error("Duplicate regulation '{0}'")]
    DuplicateRegulation(String),

    #[error("Regulation name must not be empty")]
    EmptyRegulationName,

    #[error("Clause '{0}' was added before any regulation")]
    ClauseWithoutRegulation(String),

    #[error("Clause in regulation '{0}' has an empty id")]
    EmptyClauseId(String),

    #[error("Clause '{0}' has an empty keyword")]
    EmptyKeyword(String),

    #[error("Clause '{clause_id}' has an invalid pattern: {reason}")]
    InvalidPattern { clause_id: String, reason: String },
}

/// One regulatory requirement with its pass/fail test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Clause {
    pub id: String,
    pub title: String,
    pub predicate: Predicate,
    pub remediation: String,
    /// `Matches` patterns compiled once at build time
    #[serde(skip)]
    pub(crate) patterns: CompiledPatterns,
}

impl Clause {
    pub fn patterns(&self) -> &CompiledPatterns {
        &self.patterns
    }
}

/// A named regulation and its clauses in evaluation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Regulation {
    pub name: String,
    pub clauses: Vec<Clause>,
}

/// Immutable, validated set of regulations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    version: String,
    regulations: Vec<Regulation>,
}

impl Catalog {
    pub fn builder(version: impl Into<String>) -> CatalogBuilder {
        CatalogBuilder::new(version)
    }

    /// A catalog with no regulations; every scan against it passes.
    pub fn empty(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            regulations: Vec::new(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn regulations(&self) -> &[Regulation] {
        &self.regulations
    }

    pub fn is_empty(&self) -> bool {
        self.clause_count() == 0
    }

    pub fn clause_count(&self) -> usize {
        self.regulations.iter().map(|r| r.clauses.len()).sum()
    }

    /// Every (regulation, clause) pair in catalog order
    pub fn entries(&self) -> impl Iterator<Item = (&Regulation, &Clause)> + '_ {
        self.regulations
            .iter()
            .flat_map(|r| r.clauses.iter().map(move |c| (r, c)))
    }

    /// Look up a clause by its id
    pub fn clause(&self, id: &str) -> Option<(&Regulation, &Clause)> {
        self.entries().find(|(_, c)| c.id == id)
    }

    /// Swap a clause's predicate without validation
    #[cfg(test)]
    pub(crate) fn with_predicate(mut self, id: &str, predicate: Predicate) -> Self {
        for clause in self.regulations.iter_mut().flat_map(|r| r.clauses.iter_mut()) {
            if clause.id == id {
                clause.predicate = predicate.clone();
                clause.patterns = CompiledPatterns::default();
            }
        }
        self
    }
}

/// Declarative catalog assembly.
///
/// `clause` attaches to the most recent `regulation`. Validation runs once in
/// [`CatalogBuilder::build`].
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    version: String,
    regulations: Vec<Regulation>,
    orphans: Vec<String>,
}

impl CatalogBuilder {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            regulations: Vec::new(),
            orphans: Vec::new(),
        }
    }

    /// Start a new regulation; following clauses belong to it
    pub fn regulation(mut self, name: impl Into<String>) -> Self {
        self.regulations.push(Regulation {
            name: name.into(),
            clauses: Vec::new(),
        });
        self
    }

    pub fn clause(
        mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        predicate: Predicate,
        remediation: impl Into<String>,
    ) -> Self {
        let clause = Clause {
            id: id.into(),
            title: title.into(),
            predicate: predicate.normalized(),
            remediation: remediation.into(),
            patterns: CompiledPatterns::default(),
        };

        match self.regulations.last_mut() {
            Some(regulation) => regulation.clauses.push(clause),
            None => self.orphans.push(clause.id),
        }
        self
    }

    /// Validate and freeze the catalog
    pub fn build(mut self) -> Result<Catalog, CatalogError> {
        if let Some(id) = self.orphans.into_iter().next() {
            return Err(CatalogError::ClauseWithoutRegulation(id));
        }

        let mut names = HashSet::new();
        let mut ids = HashSet::new();

        for regulation in &mut self.regulations {
            if regulation.name.trim().is_empty() {
                return Err(CatalogError::EmptyRegulationName);
            }
            if !names.insert(regulation.name.clone()) {
                return Err(CatalogError::DuplicateRegulation(regulation.name.clone()));
            }

            for clause in &mut regulation.clauses {
                clause.patterns = validate_clause(&regulation.name, clause)?;
                if !ids.insert(clause.id.clone()) {
                    return Err(CatalogError::DuplicateClauseId(clause.id.clone()));
                }
            }
        }

        Ok(Catalog {
            version: self.version,
            regulations: self.regulations,
        })
    }
}

fn validate_clause(regulation: &str, clause: &Clause) -> Result<CompiledPatterns, CatalogError> {
    if clause.id.trim().is_empty() {
        return Err(CatalogError::EmptyClauseId(regulation.to_string()));
    }

    // An empty keyword is contained in every text and would silently pass.
    if clause.predicate.keywords().iter().any(|kw| kw.trim().is_empty()) {
        return Err(CatalogError::EmptyKeyword(clause.id.clone()));
    }

    CompiledPatterns::compile(&clause.predicate).map_err(|e| CatalogError::InvalidPattern {
        clause_id: clause.id.clone(),
        reason: e.to_string(),
    })
}
