use std::sync::Mutex;

use rusqlite::{Connection, TransactionBehavior};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::schema;
use crate::tx::StoreTx;

/// SQLite-backed store.
///
/// The connection sits behind a `Mutex`, so a single `SqliteStore` can be
/// shared across request handlers. Handlers hold no other state: everything
/// lives in the database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    config: StoreConfig,
}

impl SqliteStore {
    /// Open (or create) the database described by `config` and install the
    /// schema.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let conn = match &config.path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                let conn = Connection::open(path)?;
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                    row.get::<_, String>(0)
                })?;
                conn
            }
            None => Connection::open_in_memory()?,
        };
        conn.busy_timeout(config.busy_timeout())?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        schema::install(&conn)?;

        tracing::debug!(path = ?config.path, "store opened");
        Ok(Self {
            conn: Mutex::new(conn),
            config,
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open(StoreConfig::in_memory())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Run `f` inside a write transaction.
    ///
    /// The transaction begins `IMMEDIATE`, taking SQLite's write lock before
    /// `f` reads anything. It commits if `f` returns `Ok` and rolls back if
    /// `f` returns `Err` or panics.
    pub fn write_tx<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&StoreTx<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.run(TransactionBehavior::Immediate, f)
    }

    /// Run `f` inside a read transaction, giving it a consistent snapshot
    /// across several queries. Anything `f` writes is committed as well, so
    /// callers should keep writes to [`Self::write_tx`].
    pub fn read_tx<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&StoreTx<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.run(TransactionBehavior::Deferred, f)
    }

    fn run<T, E, F>(&self, behavior: TransactionBehavior, f: F) -> Result<T, E>
    where
        F: FnOnce(&StoreTx<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let tx = conn
            .transaction_with_behavior(behavior)
            .map_err(StoreError::from)?;
        let store_tx = StoreTx::new(tx, self.config.effective_batch_size());

        // Dropping an uncommitted transaction rolls it back.
        let value = f(&store_tx)?;
        store_tx.commit()?;
        Ok(value)
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.config.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use glossa_types::{Branch, BranchId, ProjectId, Space, SpaceId};

    use super::*;

    fn space() -> Space {
        Space {
            id: SpaceId::new(),
            project_id: ProjectId::new("acme"),
            name: "web".into(),
            created_at: Utc::now(),
        }
    }

    fn branch(space_id: SpaceId, slug: &str) -> Branch {
        Branch {
            id: BranchId::new(),
            name: slug.into(),
            slug: slug.into(),
            space_id,
            source_branch_id: None,
            is_default: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn committed_writes_are_visible() {
        let store = SqliteStore::open_in_memory().unwrap();
        let space = space();

        store.write_tx(|tx| tx.insert_space(&space)).unwrap();

        let read: Option<Space> = store.read_tx(|tx| tx.space(space.id)).unwrap();
        assert_eq!(read.unwrap().name, "web");
    }

    #[test]
    fn failing_closure_rolls_back_everything() {
        let store = SqliteStore::open_in_memory().unwrap();
        let space = space();
        let b = branch(space.id, "main");

        let result: Result<(), StoreError> = store.write_tx(|tx| {
            tx.insert_space(&space)?;
            tx.insert_branch(&b)?;
            Err(StoreError::CorruptRow {
                table: "branches",
                reason: "injected".into(),
            })
        });
        assert!(result.is_err());

        let found = store
            .read_tx(|tx| Ok::<_, StoreError>((tx.space(space.id)?, tx.branch(b.id)?)))
            .unwrap();
        assert_eq!(found, (None, None));
    }

    #[test]
    fn file_backed_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::at_path(dir.path().join("nested").join("glossa.db"));
        let space = space();

        {
            let store = SqliteStore::open(config.clone()).unwrap();
            store.write_tx(|tx| tx.insert_space(&space)).unwrap();
        }

        let store = SqliteStore::open(config).unwrap();
        let read = store.read_tx(|tx| tx.space(space.id)).unwrap();
        assert_eq!(read.map(|s| s.id), Some(space.id));
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let store = SqliteStore::open_in_memory().unwrap();
        let orphan = branch(SpaceId::new(), "main");

        let err = store.write_tx(|tx| tx.insert_branch(&orphan)).unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));
    }
}
