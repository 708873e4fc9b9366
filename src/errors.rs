//! Error types for the orrery crate
//!
//! Load-time problems are collected into a single [`ValidationError`] so a
//! hand-authored catalog can be fixed in one pass. Query-time problems are
//! returned as [`OrreryError`] values.

use std::fmt;
use thiserror::Error;

/// Malformed angle or date text
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid {what} '{text}': {reason}")]
pub struct FormatError {
    /// Kind of value being parsed ("HMS angle", "epoch", ...)
    pub what: &'static str,
    /// The offending input
    pub text: String,
    /// What was wrong with it
    pub reason: String,
}

impl FormatError {
    pub fn new(what: &'static str, text: &str, reason: impl Into<String>) -> Self {
        Self {
            what,
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

/// A single schema violation found while loading a catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Record description, e.g. `body 'Earth'`
    pub record: String,
    /// Path of the offending field within the record, e.g. `orbit/@eccentricity`
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(record: impl Into<String>, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            record: record.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.record, self.field, self.message)
    }
}

/// Every violation found in a catalog load
#[derive(Error, Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// True if any violation concerns the given record and field
    pub fn mentions(&self, record: &str, field: &str) -> bool {
        self.violations
            .iter()
            .any(|v| v.record.contains(record) && v.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Catalog rejected with {} violation(s)", self.violations.len())?;
        for violation in &self.violations {
            write!(f, "\n  - {}", violation)?;
        }
        Ok(())
    }
}

/// Main error type for the orrery library
#[derive(Error, Debug)]
pub enum OrreryError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Unresolved parent name or unknown query target
    #[error("Unresolved reference: {0}")]
    Reference(String),

    /// Following parent links revisited a body
    #[error("Parent cycle detected: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    /// Kepler solver exhausted its iteration budget
    #[error(
        "Kepler solver did not converge after {iterations} iterations \
         (e={eccentricity}, M={mean_anomaly}, residual={residual:e})"
    )]
    Convergence {
        eccentricity: f64,
        mean_anomaly: f64,
        residual: f64,
        iterations: usize,
    },

    /// Elements outside the domain of the requested computation
    #[error("Domain error: {0}")]
    Domain(String),

    /// Catalog document could not be read as XML or JSON
    #[error("Invalid catalog document {origin}: {message}")]
    Document { origin: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for orrery operations
pub type Result<T> = std::result::Result<T, OrreryError>;

/// Report every problem found in one pass.
///
/// A lone problem keeps its own error; several are reported together as a
/// [`ValidationError`] built from their violations.
pub(crate) fn reject_all(problems: Vec<(OrreryError, Violation)>) -> Result<()> {
    let mut problems = problems.into_iter();
    match (problems.next(), problems.len()) {
        (None, _) => Ok(()),
        (Some((only, _)), 0) => Err(only),
        (Some((_, first)), _) => {
            let mut violations = vec![first];
            violations.extend(problems.map(|(_, violation)| violation));
            Err(ValidationError { violations }.into())
        }
    }
}
