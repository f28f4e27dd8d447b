use std::sync::Arc;

use glossa_branch::{
    BranchStore, CreateBranch, CreateSpace, EnvironmentRegistry, NoEnvironments,
};
use glossa_diff::{BranchDiff, DiffEngine};
use glossa_merge::{MergeEngine, MergeRequest, MergeResult};
use glossa_store::{SqliteStore, StoreConfig};
use glossa_types::{Branch, BranchId, ProjectId, Space, SpaceId, UserId};

use crate::access::{AllowAll, ProjectAccess, Role};
use crate::error::GlossaResult;
use crate::events::{BranchEvent, EventSink, NoopEventSink};

/// High-level Glossa API.
///
/// Every call names the acting user. The project the call touches is looked
/// up first and checked against [`ProjectAccess`]; events go to the
/// [`EventSink`] only after the change committed.
pub struct Glossa {
    pub(crate) store: Arc<SqliteStore>,
    pub(crate) branches: BranchStore,
    diff: DiffEngine,
    merge: MergeEngine,
    access: Arc<dyn ProjectAccess>,
    pub(crate) events: Arc<dyn EventSink>,
}

/// Wires collaborators into a [`Glossa`].
pub struct GlossaBuilder {
    store: Arc<SqliteStore>,
    access: Arc<dyn ProjectAccess>,
    events: Arc<dyn EventSink>,
    environments: Arc<dyn EnvironmentRegistry>,
}

impl GlossaBuilder {
    pub fn access(mut self, access: Arc<dyn ProjectAccess>) -> Self {
        self.access = access;
        self
    }

    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn environments(mut self, environments: Arc<dyn EnvironmentRegistry>) -> Self {
        self.environments = environments;
        self
    }

    pub fn build(self) -> Glossa {
        Glossa {
            branches: BranchStore::new(self.store.clone(), self.environments),
            diff: DiffEngine::new(self.store.clone()),
            merge: MergeEngine::new(self.store.clone()),
            store: self.store,
            access: self.access,
            events: self.events,
        }
    }
}

impl Glossa {
    /// Start from a store with permissive defaults: every caller is allowed,
    /// no environments exist, events are dropped.
    pub fn builder(store: Arc<SqliteStore>) -> GlossaBuilder {
        GlossaBuilder {
            store,
            access: Arc::new(AllowAll),
            events: Arc::new(NoopEventSink),
            environments: Arc::new(NoEnvironments),
        }
    }

    /// Open the database described by `config` with permissive defaults.
    pub fn open(config: StoreConfig) -> GlossaResult<Self> {
        let store = SqliteStore::open(config)?;
        Ok(Self::builder(Arc::new(store)).build())
    }

    pub fn store(&self) -> &Arc<SqliteStore> {
        &self.store
    }

    pub(crate) fn require(
        &self,
        user: &UserId,
        project: &ProjectId,
        roles: &[Role],
    ) -> GlossaResult<()> {
        self.access.verify_project_access(user, project, roles)?;
        Ok(())
    }

    pub(crate) fn require_for_branch(
        &self,
        user: &UserId,
        branch: BranchId,
        roles: &[Role],
    ) -> GlossaResult<()> {
        let project = self.branches.project_id_for_branch(branch)?;
        self.require(user, &project, roles)
    }

    fn require_for_space(&self, user: &UserId, space: SpaceId, roles: &[Role]) -> GlossaResult<()> {
        let project = self.branches.project_id_for_space(space)?;
        self.require(user, &project, roles)
    }

    // ---- Spaces ----

    pub fn create_space(
        &self,
        user: &UserId,
        project: &ProjectId,
        name: &str,
        default_branch_name: Option<&str>,
    ) -> GlossaResult<(Space, Branch)> {
        self.require(user, project, Role::MAINTAINERS)?;
        let request = CreateSpace {
            project_id: project.clone(),
            name: name.to_string(),
            default_branch_name: default_branch_name.map(str::to_string),
        };
        let (space, branch) = self.branches.create_space(request)?;
        self.events.publish(&BranchEvent::SpaceCreated {
            space_id: space.id,
            project_id: space.project_id.clone(),
            default_branch_id: branch.id,
        });
        Ok((space, branch))
    }

    pub fn space(&self, user: &UserId, id: SpaceId) -> GlossaResult<Space> {
        let space = self.branches.find_space(id)?;
        self.require(user, &space.project_id, Role::ANY)?;
        Ok(space)
    }

    pub fn spaces(&self, user: &UserId, project: &ProjectId) -> GlossaResult<Vec<Space>> {
        self.require(user, project, Role::ANY)?;
        Ok(self.branches.spaces_in_project(project)?)
    }

    // ---- Branches ----

    pub fn branches(&self, user: &UserId, space: SpaceId) -> GlossaResult<Vec<Branch>> {
        self.require_for_space(user, space, Role::ANY)?;
        Ok(self.branches.find_by_space(space)?)
    }

    pub fn branch(&self, user: &UserId, id: BranchId) -> GlossaResult<Branch> {
        self.require_for_branch(user, id, Role::ANY)?;
        Ok(self.branches.find_by_id(id)?)
    }

    pub fn lineage(&self, user: &UserId, id: BranchId) -> GlossaResult<Vec<Branch>> {
        self.require_for_branch(user, id, Role::ANY)?;
        Ok(self.branches.lineage(id)?)
    }

    /// Fork a branch. The slug is derived from the name unless given.
    pub fn create_branch(&self, user: &UserId, request: CreateBranch) -> GlossaResult<Branch> {
        self.require_for_space(user, request.space_id, Role::MAINTAINERS)?;
        let branch = self.branches.create(request)?;
        if let Some(source_branch_id) = branch.source_branch_id {
            self.events.publish(&BranchEvent::BranchCreated {
                branch_id: branch.id,
                space_id: branch.space_id,
                source_branch_id,
            });
        }
        Ok(branch)
    }

    pub fn delete_branch(&self, user: &UserId, id: BranchId) -> GlossaResult<()> {
        self.require_for_branch(user, id, Role::MAINTAINERS)?;
        let branch = self.branches.delete(id)?;
        self.events.publish(&BranchEvent::BranchDeleted {
            branch_id: branch.id,
            space_id: branch.space_id,
        });
        Ok(())
    }

    pub fn set_default_branch(&self, user: &UserId, id: BranchId) -> GlossaResult<Branch> {
        self.require_for_branch(user, id, Role::MAINTAINERS)?;
        let branch = self.branches.set_default(id)?;
        self.events.publish(&BranchEvent::DefaultBranchChanged {
            branch_id: branch.id,
            space_id: branch.space_id,
        });
        Ok(branch)
    }

    pub fn rename_branch(&self, user: &UserId, id: BranchId, name: &str) -> GlossaResult<Branch> {
        self.require_for_branch(user, id, Role::MAINTAINERS)?;
        let branch = self.branches.rename(id, name)?;
        self.events.publish(&BranchEvent::BranchRenamed {
            branch_id: branch.id,
            name: branch.name.clone(),
        });
        Ok(branch)
    }

    // ---- Diff and merge ----

    pub fn diff(&self, user: &UserId, source: BranchId, target: BranchId) -> GlossaResult<BranchDiff> {
        self.require_for_branch(user, source, Role::ANY)?;
        self.require_for_branch(user, target, Role::ANY)?;
        Ok(self.diff.compute_diff(source, target)?)
    }

    /// Merge `source` into `target`. Unresolved conflicts come back as
    /// [`MergeResult::Conflicted`], not as an error.
    pub fn merge(
        &self,
        user: &UserId,
        source: BranchId,
        target: BranchId,
        request: &MergeRequest,
    ) -> GlossaResult<MergeResult> {
        self.require_for_branch(user, source, Role::ANY)?;
        self.require_for_branch(user, target, Role::MAINTAINERS)?;
        let result = self.merge.merge(source, target, request)?;
        if let MergeResult::Applied(summary) = &result {
            self.events.publish(&BranchEvent::MergeApplied {
                source_branch_id: source,
                target_branch_id: target,
                applied_count: summary.applied_count,
            });
        }
        Ok(result)
    }
}

impl std::fmt::Debug for Glossa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Glossa")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
