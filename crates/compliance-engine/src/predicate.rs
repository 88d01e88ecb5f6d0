//! Clause predicates stored as data
//!
//! A predicate is a small boolean expression over keyword containment.
//! Catalogs are built from these values instead of closures so they can be
//! serialized, listed, and tested on their own.

use std::borrow::Cow;
use std::collections::HashMap;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize::{normalize, NormalizedText};

/// Compiled-size ceiling for `Matches` patterns (bytes)
pub const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Errors raised while evaluating a predicate against document text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Evaluation aborted: {0}")]
    Aborted(String),
}

/// Lexical test over normalized text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum Predicate {
    /// Text contains the keyword
    Contains(String),
    /// Text contains every keyword (vacuously true when empty)
    ContainsAll(Vec<String>),
    /// Text contains at least one keyword
    ContainsAny(Vec<String>),
    /// Every sub-predicate holds
    All(Vec<Predicate>),
    /// At least one sub-predicate holds
    Any(Vec<Predicate>),
    Not(Box<Predicate>),
    /// Regular expression match
    Matches(String),
}

impl Predicate {
    pub fn contains(keyword: impl Into<String>) -> Self {
        Predicate::Contains(keyword.into())
    }

    pub fn all_of<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::ContainsAll(keywords.into_iter().map(Into::into).collect())
    }

    pub fn any_of<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::ContainsAny(keywords.into_iter().map(Into::into).collect())
    }

    pub fn and(self, other: Predicate) -> Self {
        Predicate::All(vec![self, other])
    }

    pub fn or(self, other: Predicate) -> Self {
        Predicate::Any(vec![self, other])
    }

    pub fn matches(pattern: impl Into<String>) -> Self {
        Predicate::Matches(pattern.into())
    }

    /// Evaluate against normalized text.
    ///
    /// Keyword variants cannot fail; only `Matches` can, when its pattern
    /// does not compile. Patterns are compiled per call; catalog clauses go
    /// through [`Predicate::evaluate_with`] and reuse their compiled set.
    pub fn evaluate(&self, text: &NormalizedText) -> Result<bool, EvaluationError> {
        self.evaluate_with(text, &CompiledPatterns::default())
    }

    /// Evaluate using precompiled patterns, compiling only the ones missing
    /// from `patterns`
    pub fn evaluate_with(
        &self,
        text: &NormalizedText,
        patterns: &CompiledPatterns,
    ) -> Result<bool, EvaluationError> {
        match self {
            Predicate::Contains(keyword) => Ok(text.contains(keyword)),
            Predicate::ContainsAll(keywords) => Ok(keywords.iter().all(|kw| text.contains(kw))),
            Predicate::ContainsAny(keywords) => Ok(keywords.iter().any(|kw| text.contains(kw))),
            Predicate::All(predicates) => {
                for predicate in predicates {
                    if !predicate.evaluate_with(text, patterns)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Predicate::Any(predicates) => {
                for predicate in predicates {
                    if predicate.evaluate_with(text, patterns)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Predicate::Not(inner) => inner
                .evaluate_with(text, patterns)
                .map(|satisfied| !satisfied),
            Predicate::Matches(pattern) => {
                let re = patterns.get(pattern)?;
                Ok(re.is_match(text.as_str()))
            }
        }
    }

    /// Copy of this predicate with every keyword folded like document text
    pub fn normalized(&self) -> Predicate {
        match self {
            Predicate::Contains(keyword) => Predicate::Contains(fold(keyword)),
            Predicate::ContainsAll(keywords) => {
                Predicate::ContainsAll(keywords.iter().map(|kw| fold(kw)).collect())
            }
            Predicate::ContainsAny(keywords) => {
                Predicate::ContainsAny(keywords.iter().map(|kw| fold(kw)).collect())
            }
            Predicate::All(predicates) => {
                Predicate::All(predicates.iter().map(Predicate::normalized).collect())
            }
            Predicate::Any(predicates) => {
                Predicate::Any(predicates.iter().map(Predicate::normalized).collect())
            }
            Predicate::Not(inner) => Predicate::Not(Box::new(inner.normalized())),
            Predicate::Matches(pattern) => Predicate::Matches(pattern.clone()),
        }
    }

    /// All literal keywords referenced by this predicate, depth first
    pub fn keywords(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_keywords(&mut out);
        out
    }

    fn collect_keywords<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Contains(keyword) => out.push(keyword),
            Predicate::ContainsAll(keywords) | Predicate::ContainsAny(keywords) => {
                out.extend(keywords.iter().map(String::as_str))
            }
            Predicate::All(predicates) | Predicate::Any(predicates) => {
                for predicate in predicates {
                    predicate.collect_keywords(out);
                }
            }
            Predicate::Not(inner) => inner.collect_keywords(out),
            Predicate::Matches(_) => {}
        }
    }

    /// All `Matches` patterns referenced by this predicate
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            Predicate::Matches(pattern) => vec![pattern.as_str()],
            Predicate::All(predicates) | Predicate::Any(predicates) => {
                predicates.iter().flat_map(Predicate::patterns).collect()
            }
            Predicate::Not(inner) => inner.patterns(),
            _ => Vec::new(),
        }
    }
}

impl std::ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}

/// Compiled `Matches` patterns of one predicate, keyed by source
#[derive(Debug, Clone, Default)]
pub struct CompiledPatterns(HashMap<String, Regex>);

impl CompiledPatterns {
    /// Compile every pattern the predicate references
    pub fn compile(predicate: &Predicate) -> Result<Self, EvaluationError> {
        let mut compiled = HashMap::new();
        for pattern in predicate.patterns() {
            if !compiled.contains_key(pattern) {
                compiled.insert(pattern.to_string(), compile(pattern)?);
            }
        }
        Ok(Self(compiled))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn get(&self, pattern: &str) -> Result<Cow<'_, Regex>, EvaluationError> {
        match self.0.get(pattern) {
            Some(re) => Ok(Cow::Borrowed(re)),
            None => compile(pattern).map(Cow::Owned),
        }
    }
}

impl PartialEq for CompiledPatterns {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.keys().all(|k| other.0.contains_key(k))
    }
}

impl Eq for CompiledPatterns {}

/// Compile a `Matches` pattern under the size ceiling.
///
/// Matching ignores case so authors may write patterns like `HIPAA`.
pub(crate) fn compile(pattern: &str) -> Result<Regex, EvaluationError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .map_err(|e| EvaluationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

fn fold(keyword: &str) -> String {
    normalize(keyword).as_str().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> NormalizedText {
        normalize(s)
    }

    #[test]
    fn test_contains_all_requires_every_keyword() {
        let p = Predicate::all_of(["breach", "notify"]);
        assert!(p.evaluate(&text("we notify on breach")).unwrap());
        assert!(!p.evaluate(&text("breach only")).unwrap());
    }

    #[test]
    fn test_empty_keyword_sets() {
        let t = text("anything");
        assert!(Predicate::all_of(Vec::<String>::new()).evaluate(&t).unwrap());
        assert!(!Predicate::any_of(Vec::<String>::new()).evaluate(&t).unwrap());
    }

    #[test]
    fn test_combinators() {
        let p = Predicate::contains("purpose").and(Predicate::any_of(["minimization", "minimize"]));
        assert!(p.evaluate(&text("purpose limitation and data minimization")).unwrap());
        assert!(!p.evaluate(&text("purpose limitation")).unwrap());

        let q = Predicate::contains("breach notification")
            .or(Predicate::all_of(["breach", "notify"]));
        assert!(q.evaluate(&text("breach notification policy")).unwrap());
        assert!(q.evaluate(&text("after a breach we notify")).unwrap());
        assert!(!q.evaluate(&text("breach")).unwrap());

        assert!((!Predicate::contains("x")).evaluate(&text("abc")).unwrap());
    }

    #[test]
    fn test_matches_pattern() {
        let p = Predicate::matches(r"\b\d+ days\b");
        assert!(p.evaluate(&text("within 30 days")).unwrap());
        assert!(!p.evaluate(&text("promptly")).unwrap());
    }

    #[test]
    fn test_matches_ignores_case() {
        let p = Predicate::matches(r"\bHIPAA\b");
        assert!(p.evaluate(&text("We follow HIPAA rules.")).unwrap());
    }

    #[test]
    fn test_evaluate_with_reuses_compiled_patterns() {
        let p = Predicate::contains("notice").and(Predicate::matches(r"\d+ days"));
        let compiled = CompiledPatterns::compile(&p).unwrap();
        assert_eq!(compiled.len(), 1);
        assert!(p.evaluate_with(&text("Notice within 60 days"), &compiled).unwrap());
        assert!(!p.evaluate_with(&text("notice promptly"), &compiled).unwrap());
    }

    #[test]
    fn test_compiled_patterns_reject_invalid_source() {
        let p = Predicate::matches("(unclosed");
        assert!(matches!(
            CompiledPatterns::compile(&p),
            Err(EvaluationError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let p = Predicate::contains("x").or(Predicate::matches("(unclosed"));
        let err = p.evaluate(&text("no match here")).unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidPattern { .. }));
    }

    #[test]
    fn test_short_circuit_skips_faulty_branch() {
        let p = Predicate::contains("consent").or(Predicate::matches("(unclosed"));
        assert!(p.evaluate(&text("consent given")).unwrap());
    }

    #[test]
    fn test_normalized_folds_keywords() {
        let p = Predicate::any_of(["PHI", "Protected  Health\nInformation"]).normalized();
        assert_eq!(p.keywords(), vec!["phi", "protected health information"]);
    }

    #[test]
    fn test_serializes_as_tagged_data() {
        let p = Predicate::contains("consent").and(Predicate::any_of(["withdraw"]));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["op"], "all");
        assert_eq!(json["args"][0]["op"], "contains");
        assert_eq!(json["args"][0]["args"], "consent");

        let back: Predicate = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }
}
