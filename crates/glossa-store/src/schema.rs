use rusqlite::Connection;

use crate::error::StoreResult;

/// Current schema version, recorded in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS spaces (
  id TEXT PRIMARY KEY,
  project_id TEXT NOT NULL,
  name TEXT NOT NULL,
  created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS spaces_by_project ON spaces(project_id);

CREATE TABLE IF NOT EXISTS branches (
  id TEXT PRIMARY KEY,
  space_id TEXT NOT NULL REFERENCES spaces(id) ON DELETE CASCADE,
  name TEXT NOT NULL,
  slug TEXT NOT NULL,
  source_branch_id TEXT REFERENCES branches(id) ON DELETE SET NULL,
  is_default INTEGER NOT NULL DEFAULT 0 CHECK(is_default IN (0, 1)),
  created_at TEXT NOT NULL,
  UNIQUE(space_id, slug),
  CHECK(source_branch_id IS NULL OR source_branch_id <> id)
);

CREATE UNIQUE INDEX IF NOT EXISTS branches_single_default
  ON branches(space_id) WHERE is_default = 1;

CREATE INDEX IF NOT EXISTS branches_by_source ON branches(source_branch_id);

CREATE TABLE IF NOT EXISTS keys (
  id TEXT PRIMARY KEY,
  branch_id TEXT NOT NULL REFERENCES branches(id) ON DELETE CASCADE,
  namespace TEXT,
  name TEXT NOT NULL,
  description TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS keys_identity
  ON keys(branch_id, IFNULL(namespace, ''), name);

CREATE TABLE IF NOT EXISTS translations (
  key_id TEXT NOT NULL REFERENCES keys(id) ON DELETE CASCADE,
  language TEXT NOT NULL,
  value TEXT NOT NULL,
  PRIMARY KEY (key_id, language)
) WITHOUT ROWID;
"#;

/// Create all tables and indexes if they do not exist yet.
pub fn install(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(SCHEMA)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}
