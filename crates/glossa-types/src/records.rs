//! Persisted records for spaces, branches and keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{BranchId, KeyId, ProjectId, SpaceId};
use crate::key::KeyIdentity;

/// A named grouping of branches within a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: SpaceId,
    pub project_id: ProjectId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// An independently editable snapshot of a space's translation content.
///
/// `source_branch_id` is a static fork pointer: it records which branch this
/// one was copied from and never changes afterwards (it is cleared if the
/// source is deleted). Content is never shared between branches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    pub slug: String,
    pub space_id: SpaceId,
    pub source_branch_id: Option<BranchId>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl Branch {
    /// Returns `true` if this branch was forked from another branch.
    pub fn is_fork(&self) -> bool {
        self.source_branch_id.is_some()
    }
}

/// A key row on one branch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRecord {
    pub id: KeyId,
    pub branch_id: BranchId,
    #[serde(flatten)]
    pub identity: KeyIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
