//! Clause evaluation
//!
//! Evaluation is stateless: each call reads only the clause and the text, so
//! clauses may be evaluated in any order or concurrently.

use crate::catalog::Clause;
use crate::normalize::NormalizedText;
use crate::predicate::EvaluationError;

/// Returns `Ok(true)` when the text satisfies the clause.
///
/// Errors are passed through; the caller decides how to isolate them.
pub fn evaluate(clause: &Clause, text: &NormalizedText) -> Result<bool, EvaluationError> {
    clause.predicate.evaluate_with(text, &clause.patterns)
}
