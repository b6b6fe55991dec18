//! Error types for evaluation and formula registration.
//!
//! Evaluation errors are never silently defaulted: a stat that cannot be
//! computed surfaces as an error so the cache never stores a fabricated value.

use crate::types::{AttributeId, CharacterId};

/// Severity level of an error, used for logging and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// Invalid input from a caller or upstream event; reject without retry.
    Validation,

    /// Catalog or source data is inconsistent; needs investigation.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }
}

/// Errors raised while evaluating one attribute for one character.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum StatError {
    #[error("{0} not found")]
    CharacterNotFound(CharacterId),

    #[error("{0} not found")]
    AttributeNotFound(AttributeId),

    #[error("attribute '{0}' not found")]
    SlugNotFound(String),

    /// A derived attribute has no registered formula.
    #[error("derived attribute '{slug}' has no registered formula")]
    InvalidFormula { slug: String },

    /// A formula read a dependency it did not declare.
    #[error("formula '{formula}' read undeclared dependency '{dependency}'")]
    UndeclaredDependency { formula: String, dependency: String },

    /// A personal override targeted a non-base attribute.
    #[error("attribute '{slug}' is {kind} and cannot hold a personal override")]
    OverrideNotAllowed { slug: String, kind: String },

    /// A source oracle failed to answer.
    #[error("source unavailable: {0}")]
    Source(String),
}

impl StatError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CharacterNotFound(_)
            | Self::AttributeNotFound(_)
            | Self::SlugNotFound(_)
            | Self::OverrideNotAllowed { .. } => ErrorSeverity::Validation,
            Self::InvalidFormula { .. } | Self::UndeclaredDependency { .. } | Self::Source(_) => {
                ErrorSeverity::Internal
            }
        }
    }

    /// True for the missing-character / missing-attribute family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CharacterNotFound(_) | Self::AttributeNotFound(_) | Self::SlugNotFound(_)
        )
    }
}

/// Errors raised when validating the formula registry against the catalog.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormulaError {
    #[error("derived attribute '{0}' has no registered formula")]
    MissingFormula(String),

    #[error("formula '{formula}' depends on unknown attribute '{dependency}'")]
    UnknownDependency { formula: String, dependency: String },

    #[error("formula dependency cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("formula '{0}' is registered twice")]
    Duplicate(String),
}
