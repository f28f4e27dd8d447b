//! Error types for the diff crate.

use glossa_types::BranchId;

/// Errors that can occur during diff operations.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A branch referenced by the diff does not exist.
    #[error("branch not found: {0}")]
    BranchNotFound(BranchId),

    /// A fingerprint string could not be parsed.
    #[error("invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] glossa_store::StoreError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
