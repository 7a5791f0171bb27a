//! Error types produced by rule execution.

use std::fmt;

use thiserror::Error;

/// A single failed check, before it is tied to a location in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CheckError {
    message: String,
}

impl CheckError {
    /// Create a check error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The operator-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A failed check located at a path in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the node the rule was registered against.
    pub path: String,
    /// What the rule reported.
    pub error: CheckError,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error found at {}: {}", self.path, self.error)
    }
}

/// Every violation found in one pass over a document, in walk order.
///
/// A report is never empty: [`crate::Registry::validate`] only builds one
/// when at least one rule failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    violations: Vec<Violation>,
}

impl Report {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// The violations, in the order they were raised.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Number of violations in the report.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Always false for reports returned by the registry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Check Failed! {} errors found:", self.violations.len())?;
        for violation in &self.violations {
            write!(f, "\n\t{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Report {}
