//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from evaluation, repositories, and the recalculation queue
//! so callers can bubble them up with consistent context.
use stats_core::{ErrorSeverity, FormulaError, StatError};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Stat(#[from] StatError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("invalid formula registry: {0}")]
    Formula(#[from] FormulaError),

    #[error("recalculation queue is full")]
    QueueFull,

    #[error("recalculation queue is closed")]
    QueueClosed,

    #[error("{0} not found")]
    ItemNotFound(stats_core::ItemInstanceId),

    #[error("batch worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl RuntimeError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Stat(err) => err.severity(),
            Self::ItemNotFound(_) => ErrorSeverity::Validation,
            Self::Repository(_)
            | Self::Formula(_)
            | Self::QueueFull
            | Self::QueueClosed
            | Self::WorkerJoin(_) => ErrorSeverity::Internal,
        }
    }

    /// True when the requested character, attribute or item does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Stat(err) => err.is_not_found(),
            Self::ItemNotFound(_) => true,
            _ => false,
        }
    }
}

/// Collapses a runtime failure into the evaluator's error space, used when
/// the cache resolves a derived formula's dependency.
impl From<RuntimeError> for StatError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::Stat(err) => err,
            other => StatError::Source(other.to_string()),
        }
    }
}
