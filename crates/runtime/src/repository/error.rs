//! Error types raised by repository implementations.

use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository lock was poisoned")]
    LockPoisoned,

    #[error("attribute slug '{0}' is already in use")]
    DuplicateSlug(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
