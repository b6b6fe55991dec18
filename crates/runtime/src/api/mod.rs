//! Public API surface of the runtime.
//!
//! Re-exports the types downstream callers interact with alongside the
//! unified [`RuntimeError`].
mod errors;

pub use errors::{RepositoryError, Result, RuntimeError};
