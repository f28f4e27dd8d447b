use glossa_branch::BranchError;
use glossa_diff::DiffError;
use glossa_merge::MergeError;
use glossa_store::StoreError;
use glossa_types::TypeError;
use thiserror::Error;

use crate::access::AccessDenied;

/// Caller-facing error classes. Transports map each class to one status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    Validation,
    Forbidden,
    Conflict,
    Internal,
}

#[derive(Debug, Error)]
pub enum GlossaError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Forbidden(#[from] AccessDenied),

    #[error("{0}")]
    Conflict(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GlossaError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound(_) => ErrorClass::NotFound,
            Self::Validation(_) => ErrorClass::Validation,
            Self::Forbidden(_) => ErrorClass::Forbidden,
            Self::Conflict(_) => ErrorClass::Conflict,
            Self::Store(_) | Self::Internal(_) => ErrorClass::Internal,
        }
    }
}

impl From<TypeError> for GlossaError {
    fn from(e: TypeError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<BranchError> for GlossaError {
    fn from(e: BranchError) -> Self {
        match e {
            BranchError::SpaceNotFound(_) | BranchError::BranchNotFound(_) => {
                Self::NotFound(e.to_string())
            }
            BranchError::Invalid(_)
            | BranchError::EmptyName
            | BranchError::SlugTaken { .. }
            | BranchError::CrossSpaceSource { .. }
            | BranchError::LineageCycle(_) => Self::Validation(e.to_string()),
            BranchError::DefaultBranch(_) | BranchError::BoundToEnvironment(_) => {
                Self::Conflict(e.to_string())
            }
            BranchError::Store(store) => Self::Store(store),
        }
    }
}

impl From<DiffError> for GlossaError {
    fn from(e: DiffError) -> Self {
        match e {
            DiffError::BranchNotFound(_) => Self::NotFound(e.to_string()),
            DiffError::InvalidFingerprint(_) => Self::Validation(e.to_string()),
            DiffError::Store(store) => Self::Store(store),
        }
    }
}

impl From<MergeError> for GlossaError {
    fn from(e: MergeError) -> Self {
        match e {
            MergeError::BranchNotFound(_) => Self::NotFound(e.to_string()),
            MergeError::SameBranch(_)
            | MergeError::CrossSpace { .. }
            | MergeError::DuplicateResolution(_)
            | MergeError::Invalid(_) => Self::Validation(e.to_string()),
            MergeError::StaleDiff { .. } => Self::Conflict(e.to_string()),
            MergeError::Store(store) => Self::Store(store),
        }
    }
}

pub type GlossaResult<T> = Result<T, GlossaError>;
