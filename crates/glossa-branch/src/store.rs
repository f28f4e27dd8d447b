use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use glossa_store::{SqliteStore, StoreError, StoreTx};
use glossa_types::{slugify, validate_slug, Branch, BranchId, KeyId, ProjectId, Space, SpaceId};

use crate::environments::EnvironmentRegistry;
use crate::error::{BranchError, BranchResult};
use crate::requests::{CreateBranch, CreateSpace};

const DEFAULT_BRANCH_NAME: &str = "main";

/// Branch CRUD and copy-on-write forking over a [`SqliteStore`].
pub struct BranchStore {
    store: Arc<SqliteStore>,
    environments: Arc<dyn EnvironmentRegistry>,
}

impl BranchStore {
    pub fn new(store: Arc<SqliteStore>, environments: Arc<dyn EnvironmentRegistry>) -> Self {
        Self {
            store,
            environments,
        }
    }

    pub fn store(&self) -> &Arc<SqliteStore> {
        &self.store
    }

    // ---- Spaces ----

    /// Create a space together with its default branch.
    pub fn create_space(&self, request: CreateSpace) -> BranchResult<(Space, Branch)> {
        let name = non_blank(&request.name)?;
        let branch_name = match request.default_branch_name.as_deref() {
            Some(n) => non_blank(n)?,
            None => DEFAULT_BRANCH_NAME.to_string(),
        };
        let slug = slugify(&branch_name);
        validate_slug(&slug)?;

        let now = Utc::now();
        let space = Space {
            id: SpaceId::new(),
            project_id: request.project_id,
            name,
            created_at: now,
        };
        let branch = Branch {
            id: BranchId::new(),
            name: branch_name,
            slug,
            space_id: space.id,
            source_branch_id: None,
            is_default: true,
            created_at: now,
        };

        self.store.write_tx(|tx| {
            tx.insert_space(&space)?;
            tx.insert_branch(&branch)?;
            Ok::<_, BranchError>(())
        })?;

        tracing::info!(space = %space.id, project = %space.project_id, branch = %branch.slug, "space created");
        Ok((space, branch))
    }

    pub fn find_space(&self, id: SpaceId) -> BranchResult<Space> {
        self.store
            .read_tx(|tx| tx.space(id))?
            .ok_or(BranchError::SpaceNotFound(id))
    }

    pub fn spaces_in_project(&self, project: &ProjectId) -> BranchResult<Vec<Space>> {
        Ok(self.store.read_tx(|tx| tx.spaces_in_project(project))?)
    }

    // ---- Branches ----

    /// Fork a new branch from `request.source_branch_id`.
    ///
    /// The branch row, every key and every translation are written in one
    /// transaction; on any error the branch never existed.
    pub fn create(&self, request: CreateBranch) -> BranchResult<Branch> {
        let branch = self.store.write_tx(|tx| Self::create_in(tx, &request))?;
        tracing::info!(
            branch = %branch.id,
            slug = %branch.slug,
            source = ?branch.source_branch_id,
            "branch created"
        );
        Ok(branch)
    }

    /// The body of [`Self::create`], run inside a caller's transaction.
    pub fn create_in(tx: &StoreTx<'_>, request: &CreateBranch) -> BranchResult<Branch> {
        let name = non_blank(&request.name)?;
        let slug = match request.slug.as_deref() {
            Some(s) => s.trim().to_string(),
            None => slugify(&name),
        };
        validate_slug(&slug)?;

        let space_id = request.space_id;
        if tx.space(space_id)?.is_none() {
            return Err(BranchError::SpaceNotFound(space_id));
        }
        let source = tx
            .branch(request.source_branch_id)?
            .ok_or(BranchError::BranchNotFound(request.source_branch_id))?;
        if source.space_id != space_id {
            return Err(BranchError::CrossSpaceSource {
                source_branch: source.id,
                space: space_id,
            });
        }
        if tx.slug_taken(space_id, &slug)? {
            return Err(BranchError::SlugTaken {
                space: space_id,
                slug,
            });
        }

        let branch = Branch {
            id: BranchId::new(),
            name,
            slug,
            space_id,
            source_branch_id: Some(source.id),
            is_default: false,
            created_at: Utc::now(),
        };
        tx.insert_branch(&branch).map_err(|e| match e {
            e if e.is_unique_violation() => BranchError::SlugTaken {
                space: space_id,
                slug: branch.slug.clone(),
            },
            e => BranchError::Store(e),
        })?;

        copy_keys(tx, source.id, branch.id)?;
        Ok(branch)
    }

    /// Delete a branch and cascade its content.
    ///
    /// Refused while the branch is its space's default or an environment
    /// still references it.
    pub fn delete(&self, id: BranchId) -> BranchResult<Branch> {
        let branch = self.store.write_tx(|tx| {
            let branch = tx.branch(id)?.ok_or(BranchError::BranchNotFound(id))?;
            if branch.is_default {
                tracing::warn!(branch = %id, "refusing to delete default branch");
                return Err(BranchError::DefaultBranch(id));
            }
            if self.environments.has_environments(id) {
                tracing::warn!(branch = %id, "refusing to delete branch bound to an environment");
                return Err(BranchError::BoundToEnvironment(id));
            }
            tx.delete_branch(id)?;
            Ok(branch)
        })?;

        tracing::info!(branch = %id, slug = %branch.slug, "branch deleted");
        Ok(branch)
    }

    /// Branches of a space, default first, then by creation time and slug.
    pub fn find_by_space(&self, space: SpaceId) -> BranchResult<Vec<Branch>> {
        self.store.read_tx(|tx| {
            if tx.space(space)?.is_none() {
                return Err(BranchError::SpaceNotFound(space));
            }
            Ok(tx.branches_in_space(space)?)
        })
    }

    pub fn find_by_id(&self, id: BranchId) -> BranchResult<Branch> {
        self.store
            .read_tx(|tx| tx.branch(id))?
            .ok_or(BranchError::BranchNotFound(id))
    }

    pub fn project_id_for_branch(&self, id: BranchId) -> BranchResult<ProjectId> {
        self.store.read_tx(|tx| {
            let branch = tx.branch(id)?.ok_or(BranchError::BranchNotFound(id))?;
            let space = tx
                .space(branch.space_id)?
                .ok_or(BranchError::SpaceNotFound(branch.space_id))?;
            Ok(space.project_id)
        })
    }

    pub fn project_id_for_space(&self, id: SpaceId) -> BranchResult<ProjectId> {
        Ok(self.find_space(id)?.project_id)
    }

    pub fn default_branch(&self, space: SpaceId) -> BranchResult<Branch> {
        self.find_by_space(space)?
            .into_iter()
            .find(|b| b.is_default)
            .ok_or_else(|| {
                BranchError::Store(StoreError::CorruptRow {
                    table: "branches",
                    reason: format!("space {space} has no default branch"),
                })
            })
    }

    /// Make `id` the default branch of its space.
    pub fn set_default(&self, id: BranchId) -> BranchResult<Branch> {
        let (branch, changed) = self.store.write_tx(|tx| {
            let mut branch = tx.branch(id)?.ok_or(BranchError::BranchNotFound(id))?;
            if branch.is_default {
                return Ok::<_, BranchError>((branch, false));
            }
            tx.set_default_branch(branch.space_id, id)?;
            branch.is_default = true;
            Ok((branch, true))
        })?;

        if changed {
            tracing::info!(branch = %id, space = %branch.space_id, "default branch changed");
        }
        Ok(branch)
    }

    /// Change a branch's display name. The slug is left as is.
    pub fn rename(&self, id: BranchId, name: &str) -> BranchResult<Branch> {
        let name = non_blank(name)?;
        let branch = self.store.write_tx(|tx| {
            if !tx.rename_branch(id, &name)? {
                return Err(BranchError::BranchNotFound(id));
            }
            tx.branch(id)?.ok_or(BranchError::BranchNotFound(id))
        })?;
        tracing::info!(branch = %id, name = %branch.name, "branch renamed");
        Ok(branch)
    }

    /// The fork chain from `id` up to its root, starting with `id` itself.
    pub fn lineage(&self, id: BranchId) -> BranchResult<Vec<Branch>> {
        self.store.read_tx(|tx| {
            let mut chain = Vec::new();
            let mut seen = HashSet::new();
            let mut next = Some(id);
            while let Some(current) = next {
                if !seen.insert(current) {
                    return Err(BranchError::LineageCycle(id));
                }
                let branch = tx
                    .branch(current)?
                    .ok_or(BranchError::BranchNotFound(current))?;
                next = branch.source_branch_id;
                chain.push(branch);
            }
            Ok(chain)
        })
    }
}

impl std::fmt::Debug for BranchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BranchStore")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

fn non_blank(name: &str) -> BranchResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BranchError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Duplicate every key of `from` (with its translations) onto `to`.
fn copy_keys(tx: &StoreTx<'_>, from: BranchId, to: BranchId) -> BranchResult<()> {
    let keys = tx.keys_of_branch(from)?;
    let mut translations = 0;
    for (index, chunk) in keys.chunks(tx.batch_size()).enumerate() {
        let pairs: Vec<(KeyId, KeyId)> = chunk.iter().map(|key| (key.id, KeyId::new())).collect();
        let (copied, values) = tx.copy_key_chunk(to, &pairs)?;
        translations += values;
        tracing::debug!(branch = %to, chunk = index, keys = copied, "copied key chunk");
    }
    tracing::debug!(branch = %to, keys = keys.len(), translations, "branch content copied");
    Ok(())
}
