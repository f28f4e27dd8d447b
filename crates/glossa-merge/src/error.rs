//! Error types for the merge crate.

use glossa_diff::DiffFingerprint;
use glossa_types::{BranchId, KeyIdentity, TypeError};

/// Errors that abort a merge. An unresolved conflict is not one of them.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("branch not found: {0}")]
    BranchNotFound(BranchId),

    #[error("cannot merge branch {0} into itself")]
    SameBranch(BranchId),

    #[error("branches {source_branch} and {target_branch} belong to different spaces")]
    CrossSpace {
        source_branch: BranchId,
        target_branch: BranchId,
    },

    /// The branches changed since the caller computed their diff.
    #[error("diff is stale: expected {expected}, found {actual}")]
    StaleDiff {
        expected: DiffFingerprint,
        actual: DiffFingerprint,
    },

    #[error("more than one resolution for key {0}")]
    DuplicateResolution(KeyIdentity),

    /// An explicit resolution carries a bad language code.
    #[error(transparent)]
    Invalid(#[from] TypeError),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] glossa_store::StoreError),
}
