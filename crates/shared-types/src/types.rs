//! Scan response types shared between the engine and its callers.
//!
//! Field names serialize in camelCase; the JSON shape
//! `{ ok, totalFindings, findings: [{ regulation, clauseId, clauseTitle, remediation }] }`
//! is rendered directly by the UI and must not drift.

use serde::{Deserialize, Serialize};

/// One clause that was not satisfied by the scanned document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub regulation: String, // e.g., "GDPR"
    pub clause_id: String,  // e.g., "GDPR-Article-5"
    pub clause_title: String,
    pub remediation: String,
}

/// A clause whose check could not be evaluated.
///
/// The clause is still reported as a finding; this records why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClauseFault {
    pub clause_id: String,
    pub error: String,
}

/// Outcome of scanning one document against a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub ok: bool,
    pub total_findings: usize,
    pub findings: Vec<Finding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<ClauseFault>,
}

impl ScanResult {
    /// Build a result, deriving `ok` and `total_findings` from the findings.
    pub fn new(findings: Vec<Finding>, faults: Vec<ClauseFault>) -> Self {
        let total_findings = findings.len();
        Self {
            ok: total_findings == 0,
            total_findings,
            findings,
            faults,
        }
    }

    /// Clause ids of all findings, in report order
    pub fn clause_ids(&self) -> Vec<&str> {
        self.findings.iter().map(|f| f.clause_id.as_str()).collect()
    }
}

impl Default for ScanResult {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}
