//! Relational persistence for Glossa.
//!
//! Spaces, branches, keys and translations live in SQLite. Every operation
//! that reads and then writes runs inside one transaction obtained from
//! [`SqliteStore::write_tx`], so callers never observe a half-copied branch
//! or a half-applied merge.
//!
//! # Tables
//!
//! - `spaces`: one row per space, tagged with its project
//! - `branches`: branch metadata; `(space_id, slug)` unique, at most one
//!   default per space
//! - `keys`: one row per key per branch; `(branch_id, namespace, name)`
//!   unique with `NULL` namespaces treated as equal
//! - `translations`: `(key_id, language)` primary key
//!
//! # Design Rules
//!
//! 1. Write transactions start with `BEGIN IMMEDIATE`: the write lock is
//!    taken before the first read, so the read phase and the write phase of
//!    one operation see the same baseline.
//! 2. A closure that returns `Err` rolls the whole transaction back.
//! 3. Bulk reads load a branch with a single query; writes go through cached
//!    prepared statements.
//! 4. All SQLite errors are propagated, never silently ignored.

pub mod config;
pub mod content;
pub mod error;
pub mod schema;
pub mod sqlite;
pub mod tx;

pub use config::StoreConfig;
pub use content::{BranchContent, KeyContent};
pub use error::{StoreError, StoreResult};
pub use sqlite::SqliteStore;
pub use tx::StoreTx;
