//! Error types for branch operations.

use glossa_types::{BranchId, SpaceId, TypeError};
use thiserror::Error;

/// Errors that can occur during branch operations.
#[derive(Debug, Error)]
pub enum BranchError {
    /// The space does not exist.
    #[error("space not found: {0}")]
    SpaceNotFound(SpaceId),

    /// The branch does not exist.
    #[error("branch not found: {0}")]
    BranchNotFound(BranchId),

    /// A name, slug or id failed validation.
    #[error(transparent)]
    Invalid(#[from] TypeError),

    /// The branch or space display name is blank.
    #[error("name must not be empty")]
    EmptyName,

    /// Another branch in the space already uses this slug.
    #[error("slug {slug:?} is already used in space {space}")]
    SlugTaken { space: SpaceId, slug: String },

    /// The fork source lives in a different space.
    #[error("source branch {source_branch} does not belong to space {space}")]
    CrossSpaceSource {
        source_branch: BranchId,
        space: SpaceId,
    },

    /// The fork chain loops back on itself.
    #[error("branch lineage of {0} contains a cycle")]
    LineageCycle(BranchId),

    /// The default branch of a space cannot be deleted.
    #[error("branch {0} is the default branch of its space")]
    DefaultBranch(BranchId),

    /// An environment still points at the branch.
    #[error("branch {0} is bound to an environment")]
    BoundToEnvironment(BranchId),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] glossa_store::StoreError),
}

/// Convenience type alias for branch operations.
pub type BranchResult<T> = Result<T, BranchError>;
