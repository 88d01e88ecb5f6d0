//! Scan orchestration
//!
//! Normalizes the document once, evaluates every clause in catalog order and
//! turns unsatisfied clauses into findings. A clause whose evaluation fails is
//! reported as a finding and recorded in `faults`; the rest of the scan runs.

use std::num::NonZeroUsize;
use std::thread;

use shared_types::{ClauseFault, Finding, ScanResult};
use tracing::{debug, warn};

use crate::catalog::{Catalog, Clause, Regulation};
use crate::evaluator::evaluate;
use crate::normalize::normalize;
use crate::predicate::EvaluationError;

/// Scan raw document text against the catalog
pub fn scan(catalog: &Catalog, raw_text: &str) -> ScanResult {
    let text = normalize(raw_text);
    let outcomes: Vec<_> = catalog
        .entries()
        .map(|(regulation, clause)| (regulation, clause, evaluate(clause, &text)))
        .collect();

    assemble(catalog, outcomes)
}

/// Same result as [`scan`], with clauses evaluated on scoped worker threads.
///
/// Outcomes are reassembled by catalog position, never completion order.
pub fn scan_parallel(catalog: &Catalog, raw_text: &str) -> ScanResult {
    let text = normalize(raw_text);
    let entries: Vec<(&Regulation, &Clause)> = catalog.entries().collect();
    if entries.is_empty() {
        return ScanResult::default();
    }

    let workers = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(entries.len());
    let chunk_size = entries.len().div_ceil(workers);

    let results: Vec<Result<bool, EvaluationError>> = thread::scope(|s| {
        let handles: Vec<_> = entries
            .chunks(chunk_size)
            .map(|chunk| {
                let text = &text;
                let handle = s.spawn(move || {
                    chunk
                        .iter()
                        .map(|(_, clause)| evaluate(clause, text))
                        .collect::<Vec<_>>()
                });
                (chunk.len(), handle)
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|(len, handle)| match handle.join() {
                Ok(results) => results,
                Err(_) => vec![
                    Err(EvaluationError::Aborted("worker thread panicked".to_string()));
                    len
                ],
            })
            .collect()
    });

    let outcomes = entries
        .into_iter()
        .zip(results)
        .map(|((regulation, clause), result)| (regulation, clause, result))
        .collect();

    assemble(catalog, outcomes)
}

fn assemble(
    catalog: &Catalog,
    outcomes: Vec<(&Regulation, &Clause, Result<bool, EvaluationError>)>,
) -> ScanResult {
    let mut findings = Vec::new();
    let mut faults = Vec::new();

    for (regulation, clause, outcome) in outcomes {
        let satisfied = match outcome {
            Ok(satisfied) => satisfied,
            Err(err) => {
                warn!(clause_id = %clause.id, error = %err, "Clause evaluation failed; reporting as unsatisfied");
                faults.push(ClauseFault {
                    clause_id: clause.id.clone(),
                    error: err.to_string(),
                });
                false
            }
        };

        if !satisfied {
            findings.push(finding(regulation, clause));
        }
    }

    let result = ScanResult::new(findings, faults);
    debug!(
        catalog_version = catalog.version(),
        clauses = catalog.clause_count(),
        findings = result.total_findings,
        faults = result.faults.len(),
        "Scan complete"
    );
    result
}

fn finding(regulation: &Regulation, clause: &Clause) -> Finding {
    Finding {
        regulation: regulation.name.clone(),
        clause_id: clause.id.clone(),
        clause_title: clause.title.clone(),
        remediation: clause.remediation.clone(),
    }
}
