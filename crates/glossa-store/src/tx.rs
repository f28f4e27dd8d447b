//! Primitives available inside a store transaction.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use glossa_types::{
    Branch, BranchId, KeyId, KeyIdentity, KeyRecord, LanguageValues, ProjectId, Space, SpaceId,
    TypeError,
};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, OptionalExtension, Row, Transaction};

use crate::content::{BranchContent, KeyContent};
use crate::error::StoreResult;

const BRANCH_COLUMNS: &str =
    "id, name, slug, space_id, source_branch_id, is_default, created_at";

/// An open transaction with typed accessors for every table.
///
/// Obtained from [`crate::SqliteStore::write_tx`] or
/// [`crate::SqliteStore::read_tx`]; it cannot outlive the closure it was
/// handed to.
pub struct StoreTx<'conn> {
    tx: Transaction<'conn>,
    batch_size: usize,
}

impl<'conn> StoreTx<'conn> {
    pub(crate) fn new(tx: Transaction<'conn>, batch_size: usize) -> Self {
        Self { tx, batch_size }
    }

    pub(crate) fn commit(self) -> StoreResult<()> {
        self.tx.commit()?;
        Ok(())
    }

    /// Keys per chunk for bulk copies.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    // ---- Spaces ----

    pub fn insert_space(&self, space: &Space) -> StoreResult<()> {
        self.tx.execute(
            "INSERT INTO spaces(id, project_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                space.id.to_string(),
                space.project_id.as_str(),
                space.name,
                space.created_at
            ],
        )?;
        Ok(())
    }

    pub fn space(&self, id: SpaceId) -> StoreResult<Option<Space>> {
        let space = self
            .tx
            .query_row(
                "SELECT id, project_id, name, created_at FROM spaces WHERE id = ?1",
                params![id.to_string()],
                space_from_row,
            )
            .optional()?;
        Ok(space)
    }

    pub fn spaces_in_project(&self, project: &ProjectId) -> StoreResult<Vec<Space>> {
        let mut stmt = self.tx.prepare_cached(
            "SELECT id, project_id, name, created_at FROM spaces \
             WHERE project_id = ?1 ORDER BY created_at, name",
        )?;
        let rows = stmt.query_map(params![project.as_str()], space_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ---- Branches ----

    pub fn insert_branch(&self, branch: &Branch) -> StoreResult<()> {
        self.tx.execute(
            "INSERT INTO branches(id, name, slug, space_id, source_branch_id, is_default, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                branch.id.to_string(),
                branch.name,
                branch.slug,
                branch.space_id.to_string(),
                branch.source_branch_id.map(|id| id.to_string()),
                branch.is_default,
                branch.created_at
            ],
        )?;
        Ok(())
    }

    pub fn branch(&self, id: BranchId) -> StoreResult<Option<Branch>> {
        let sql = format!("SELECT {BRANCH_COLUMNS} FROM branches WHERE id = ?1");
        let branch = self
            .tx
            .query_row(&sql, params![id.to_string()], branch_from_row)
            .optional()?;
        Ok(branch)
    }

    /// Branches of a space: default first, then oldest first, then by slug.
    pub fn branches_in_space(&self, space: SpaceId) -> StoreResult<Vec<Branch>> {
        let sql = format!(
            "SELECT {BRANCH_COLUMNS} FROM branches WHERE space_id = ?1 \
             ORDER BY is_default DESC, created_at, slug"
        );
        let mut stmt = self.tx.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![space.to_string()], branch_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn slug_taken(&self, space: SpaceId, slug: &str) -> StoreResult<bool> {
        let taken = self.tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM branches WHERE space_id = ?1 AND slug = ?2)",
            params![space.to_string(), slug],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(taken)
    }

    /// Move the default flag of `space` to `branch`.
    pub fn set_default_branch(&self, space: SpaceId, branch: BranchId) -> StoreResult<()> {
        self.tx.execute(
            "UPDATE branches SET is_default = 0 WHERE space_id = ?1 AND is_default = 1",
            params![space.to_string()],
        )?;
        self.tx.execute(
            "UPDATE branches SET is_default = 1 WHERE id = ?1 AND space_id = ?2",
            params![branch.to_string(), space.to_string()],
        )?;
        Ok(())
    }

    pub fn rename_branch(&self, branch: BranchId, name: &str) -> StoreResult<bool> {
        let changed = self.tx.execute(
            "UPDATE branches SET name = ?2 WHERE id = ?1",
            params![branch.to_string(), name],
        )?;
        Ok(changed > 0)
    }

    /// Delete a branch; keys and translations cascade and forks pointing at it
    /// lose their source pointer. Returns `true` if the branch existed.
    pub fn delete_branch(&self, branch: BranchId) -> StoreResult<bool> {
        let deleted = self.tx.execute(
            "DELETE FROM branches WHERE id = ?1",
            params![branch.to_string()],
        )?;
        Ok(deleted > 0)
    }

    // ---- Keys ----

    /// All key rows of a branch, ordered by identity.
    pub fn keys_of_branch(&self, branch: BranchId) -> StoreResult<Vec<KeyRecord>> {
        let mut stmt = self.tx.prepare_cached(
            "SELECT id, branch_id, namespace, name, description FROM keys \
             WHERE branch_id = ?1 ORDER BY namespace IS NOT NULL, namespace, name",
        )?;
        let rows = stmt.query_map(params![branch.to_string()], key_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn find_key(
        &self,
        branch: BranchId,
        identity: &KeyIdentity,
    ) -> StoreResult<Option<KeyRecord>> {
        let mut stmt = self.tx.prepare_cached(
            "SELECT id, branch_id, namespace, name, description FROM keys \
             WHERE branch_id = ?1 AND IFNULL(namespace, '') = IFNULL(?2, '') AND name = ?3",
        )?;
        let key = stmt
            .query_row(
                params![branch.to_string(), identity.namespace(), identity.name()],
                key_from_row,
            )
            .optional()?;
        Ok(key)
    }

    pub fn insert_key(&self, key: &KeyRecord) -> StoreResult<()> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO keys(id, branch_id, namespace, name, description) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        stmt.execute(params![
            key.id.to_string(),
            key.branch_id.to_string(),
            key.identity.namespace(),
            key.identity.name(),
            key.description
        ])?;
        Ok(())
    }

    pub fn update_key_description(
        &self,
        key: KeyId,
        description: Option<&str>,
    ) -> StoreResult<bool> {
        let changed = self.tx.execute(
            "UPDATE keys SET description = ?2 WHERE id = ?1",
            params![key.to_string(), description],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_key(&self, key: KeyId) -> StoreResult<bool> {
        let deleted = self
            .tx
            .execute("DELETE FROM keys WHERE id = ?1", params![key.to_string()])?;
        Ok(deleted > 0)
    }

    // ---- Translations ----

    /// Insert or overwrite the given translations of one key.
    pub fn upsert_translations(&self, key: KeyId, values: &LanguageValues) -> StoreResult<()> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO translations(key_id, language, value) VALUES (?1, ?2, ?3) \
             ON CONFLICT(key_id, language) DO UPDATE SET value = excluded.value",
        )?;
        let key = key.to_string();
        for (language, value) in values {
            stmt.execute(params![key, language, value])?;
        }
        Ok(())
    }

    /// Remove the listed languages from one key. Returns the number removed.
    pub fn delete_translations<'a, I>(&self, key: KeyId, languages: I) -> StoreResult<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut stmt = self
            .tx
            .prepare_cached("DELETE FROM translations WHERE key_id = ?1 AND language = ?2")?;
        let key = key.to_string();
        let mut removed = 0;
        for language in languages {
            removed += stmt.execute(params![key, language])?;
        }
        Ok(removed)
    }

    /// Copy a chunk of keys onto branch `to` together with their translations.
    ///
    /// Each pair is `(existing key, id for its copy)`. The chunk costs one
    /// `INSERT ... SELECT` for keys and one for translations. Returns the
    /// number of `(keys, translations)` written.
    pub fn copy_key_chunk(
        &self,
        to: BranchId,
        pairs: &[(KeyId, KeyId)],
    ) -> StoreResult<(usize, usize)> {
        if pairs.is_empty() {
            return Ok((0, 0));
        }
        let ids = vec!["(?, ?)"; pairs.len()].join(", ");
        let mut bound: Vec<String> = pairs
            .iter()
            .flat_map(|(from, copy)| [from.to_string(), copy.to_string()])
            .collect();

        let translation_sql = format!(
            "WITH ids(old_id, new_id) AS (VALUES {ids}) \
             INSERT INTO translations(key_id, language, value) \
             SELECT ids.new_id, t.language, t.value \
             FROM ids JOIN translations t ON t.key_id = ids.old_id"
        );
        let key_sql = format!(
            "WITH ids(old_id, new_id) AS (VALUES {ids}) \
             INSERT INTO keys(id, branch_id, namespace, name, description) \
             SELECT ids.new_id, ?, k.namespace, k.name, k.description \
             FROM ids JOIN keys k ON k.id = ids.old_id"
        );

        bound.push(to.to_string());
        let keys = self.tx.execute(&key_sql, params_from_iter(&bound))?;
        bound.pop();
        let translations = self.tx.execute(&translation_sql, params_from_iter(&bound))?;
        Ok((keys, translations))
    }

    /// Load a branch's keys and translations with a single query.
    pub fn load_content(&self, branch: BranchId) -> StoreResult<BranchContent> {
        let mut stmt = self.tx.prepare_cached(
            "SELECT k.id, k.namespace, k.name, k.description, t.language, t.value \
             FROM keys k LEFT JOIN translations t ON t.key_id = k.id \
             WHERE k.branch_id = ?1",
        )?;
        let mut rows = stmt.query(params![branch.to_string()])?;

        let mut content = BranchContent::empty(branch);
        while let Some(row) = rows.next()? {
            let identity = KeyIdentity::from_columns(row.get(1)?, row.get(2)?);
            let entry = match content.keys.entry(identity) {
                std::collections::btree_map::Entry::Occupied(e) => e.into_mut(),
                std::collections::btree_map::Entry::Vacant(e) => e.insert(KeyContent {
                    key_id: id_column(row, 0)?,
                    description: row.get(3)?,
                    values: LanguageValues::new(),
                }),
            };
            let language: Option<String> = row.get(4)?;
            if let Some(language) = language {
                entry.values.insert(language, row.get(5)?);
            }
        }
        Ok(content)
    }
}

fn id_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = TypeError>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn space_from_row(row: &Row<'_>) -> rusqlite::Result<Space> {
    Ok(Space {
        id: id_column(row, 0)?,
        project_id: ProjectId::new(row.get::<_, String>(1)?),
        name: row.get(2)?,
        created_at: row.get::<_, DateTime<Utc>>(3)?,
    })
}

fn branch_from_row(row: &Row<'_>) -> rusqlite::Result<Branch> {
    let source: Option<String> = row.get(4)?;
    let source_branch_id = source
        .map(|raw| {
            raw.parse::<BranchId>()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))
        })
        .transpose()?;
    Ok(Branch {
        id: id_column(row, 0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        space_id: id_column(row, 3)?,
        source_branch_id,
        is_default: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn key_from_row(row: &Row<'_>) -> rusqlite::Result<KeyRecord> {
    Ok(KeyRecord {
        id: id_column(row, 0)?,
        branch_id: id_column(row, 1)?,
        identity: KeyIdentity::from_columns(row.get(2)?, row.get(3)?),
        description: row.get(4)?,
    })
}
