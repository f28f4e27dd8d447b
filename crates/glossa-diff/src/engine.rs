use std::sync::Arc;

use glossa_store::{SqliteStore, StoreTx};
use glossa_types::BranchId;

use crate::branch_diff::{diff_contents, BranchDiff};
use crate::error::{DiffError, DiffResult};

/// Computes diffs between branches held in a [`SqliteStore`].
#[derive(Clone, Debug)]
pub struct DiffEngine {
    store: Arc<SqliteStore>,
}

impl DiffEngine {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    /// Diff `source` against `target` from one consistent snapshot.
    pub fn compute_diff(&self, source: BranchId, target: BranchId) -> DiffResult<BranchDiff> {
        let diff = self
            .store
            .read_tx(|tx| Self::compute_diff_in(tx, source, target))?;
        tracing::debug!(
            %source,
            %target,
            added = diff.added.len(),
            modified = diff.modified.len(),
            deleted = diff.deleted.len(),
            "diff computed"
        );
        Ok(diff)
    }

    /// Diff inside a caller's transaction. Each side is loaded with a single
    /// query.
    pub fn compute_diff_in(
        tx: &StoreTx<'_>,
        source: BranchId,
        target: BranchId,
    ) -> DiffResult<BranchDiff> {
        for id in [source, target] {
            if tx.branch(id)?.is_none() {
                return Err(DiffError::BranchNotFound(id));
            }
        }

        let source_content = tx.load_content(source)?;
        let target_content = tx.load_content(target)?;
        Ok(diff_contents(&source_content, &target_content))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use glossa_store::StoreError;
    use glossa_types::{Branch, KeyId, KeyIdentity, KeyRecord, LanguageValues, ProjectId, Space, SpaceId};

    use super::*;

    struct Fixture {
        engine: DiffEngine,
        store: Arc<SqliteStore>,
        main: BranchId,
        feature: BranchId,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let space = Space {
            id: SpaceId::new(),
            project_id: ProjectId::new("acme"),
            name: "web".into(),
            created_at: Utc::now(),
        };
        let branch = |slug: &str, is_default| Branch {
            id: BranchId::new(),
            name: slug.into(),
            slug: slug.into(),
            space_id: space.id,
            source_branch_id: None,
            is_default,
            created_at: Utc::now(),
        };
        let main = branch("main", true);
        let feature = branch("feature", false);
        store
            .write_tx(|tx| {
                tx.insert_space(&space)?;
                tx.insert_branch(&main)?;
                tx.insert_branch(&feature)
            })
            .unwrap();
        Fixture {
            engine: DiffEngine::new(store.clone()),
            store,
            main: main.id,
            feature: feature.id,
        }
    }

    fn put(store: &SqliteStore, branch: BranchId, name: &str, lang: &str, value: &str) {
        store
            .write_tx(|tx| {
                let identity = KeyIdentity::new(None, name).unwrap();
                let key_id = match tx.find_key(branch, &identity)? {
                    Some(key) => key.id,
                    None => {
                        let key = KeyRecord {
                            id: KeyId::new(),
                            branch_id: branch,
                            identity,
                            description: None,
                        };
                        tx.insert_key(&key)?;
                        key.id
                    }
                };
                let values = LanguageValues::from([(lang.to_string(), value.to_string())]);
                tx.upsert_translations(key_id, &values)?;
                Ok::<_, StoreError>(())
            })
            .unwrap();
    }

    #[test]
    fn diff_reads_both_branches() {
        let f = fixture();
        put(&f.store, f.main, "title", "en", "Title");
        put(&f.store, f.main, "body", "en", "Body");
        put(&f.store, f.feature, "title", "en", "New title");
        put(&f.store, f.feature, "extra", "en", "Extra");

        let diff = f.engine.compute_diff(f.feature, f.main).unwrap();
        assert_eq!(diff.added[0].identity.name(), "extra");
        assert_eq!(diff.modified[0].identity.name(), "title");
        assert_eq!(diff.deleted[0].identity.name(), "body");
    }

    #[test]
    fn repeated_diffs_are_identical() {
        let f = fixture();
        put(&f.store, f.main, "title", "en", "Title");
        put(&f.store, f.feature, "title", "fr", "Titre");

        let first = f.engine.compute_diff(f.feature, f.main).unwrap();
        let second = f.engine.compute_diff(f.feature, f.main).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn branch_against_itself_is_empty() {
        let f = fixture();
        put(&f.store, f.main, "title", "en", "Title");
        put(&f.store, f.main, "draft", "en", "Draft");

        let diff = f.engine.compute_diff(f.main, f.main).unwrap();
        assert!(diff.is_empty());
        assert_eq!(diff.stats(), Default::default());
    }

    #[test]
    fn untranslated_target_key_is_added() {
        let f = fixture();
        put(&f.store, f.feature, "draft", "en", "Draft");
        f.store
            .write_tx(|tx| {
                tx.insert_key(&KeyRecord {
                    id: KeyId::new(),
                    branch_id: f.main,
                    identity: KeyIdentity::new(None, "draft").unwrap(),
                    description: None,
                })
            })
            .unwrap();

        let diff = f.engine.compute_diff(f.feature, f.main).unwrap();
        assert!(diff.modified.is_empty());
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].values["en"], "Draft");
    }

    #[test]
    fn missing_branch_is_not_found() {
        let f = fixture();
        let ghost = BranchId::new();
        assert!(matches!(
            f.engine.compute_diff(f.main, ghost),
            Err(DiffError::BranchNotFound(id)) if id == ghost
        ));
    }
}
