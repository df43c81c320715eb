//! Model errors

use std::fmt;

use thiserror::Error;

/// One or more construction invariants were violated.
///
/// Every violated constraint is collected, so callers see the full list rather
/// than just the first failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<String>,
}

impl ValidationError {
    pub fn new(violation: impl Into<String>) -> Self {
        Self {
            violations: vec![violation.into()],
        }
    }

    pub fn from_violations(violations: Vec<String>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// True if any violation message contains `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.violations.iter().any(|v| v.contains(needle))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: {}", self.violations.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Accumulates violations while a value is being checked.
#[derive(Debug, Default)]
pub struct Violations(Vec<String>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: impl Into<String>) {
        self.0.push(violation.into());
    }

    /// Record `violation` when `condition` does not hold
    pub fn check(&mut self, condition: bool, violation: impl FnOnce() -> String) {
        if !condition {
            self.0.push(violation());
        }
    }

    pub fn extend(&mut self, error: ValidationError) {
        self.0.extend(error.violations);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn finish(self) -> std::result::Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::from_violations(self.0))
        }
    }
}

/// Malformed canonical string input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} '{input}': bad {segment} '{value}'")]
pub struct ParseError {
    /// Type being parsed (e.g. "BarType")
    pub kind: &'static str,
    /// The full input string
    pub input: String,
    /// Name of the offending segment
    pub segment: &'static str,
    /// The offending substring
    pub value: String,
}

impl ParseError {
    pub fn new(
        kind: &'static str,
        input: impl Into<String>,
        segment: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            input: input.into(),
            segment,
            value: value.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("currency mismatch: {lhs} vs {rhs}")]
    CurrencyMismatch { lhs: String, rhs: String },
}

pub type Result<T> = std::result::Result<T, Error>;
