use glossa_types::{BranchId, ProjectId, SpaceId};

/// Input for [`crate::BranchStore::create`].
#[derive(Clone, Debug)]
pub struct CreateBranch {
    pub name: String,
    /// Explicit slug; derived from `name` when `None`.
    pub slug: Option<String>,
    pub space_id: SpaceId,
    pub source_branch_id: BranchId,
}

impl CreateBranch {
    /// Fork `source_branch_id` under `name`, deriving the slug from the name.
    pub fn fork(space_id: SpaceId, source_branch_id: BranchId, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: None,
            space_id,
            source_branch_id,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}

/// Input for [`crate::BranchStore::create_space`].
#[derive(Clone, Debug)]
pub struct CreateSpace {
    pub project_id: ProjectId,
    pub name: String,
    /// Name of the initial default branch; `main` when `None`.
    pub default_branch_name: Option<String>,
}

impl CreateSpace {
    pub fn new(project_id: impl Into<ProjectId>, name: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            name: name.into(),
            default_branch_name: None,
        }
    }
}
