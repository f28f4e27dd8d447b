//! Diff engine for Glossa.
//!
//! Compares the content of two branches key by key, producing a categorized
//! change set. Keys are matched by [`glossa_types::KeyIdentity`], never by
//! row id: forked branches hold the same logical keys under fresh ids.
//!
//! # Key Types
//!
//! - [`BranchDiff`] -- added / modified / deleted keys, sorted by identity
//! - [`DiffFingerprint`] -- BLAKE3 digest pinning one exact diff
//! - [`DiffEngine`] -- loads both branches from the store and diffs them
//! - [`InlineChange`] -- word-level hints for one modified value

pub mod branch_diff;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod inline;

pub use branch_diff::{
    diff_contents, AddedKey, BranchDiff, DeletedKey, DiffStats, LanguageChange, ModifiedKey,
};
pub use engine::DiffEngine;
pub use error::{DiffError, DiffResult};
pub use fingerprint::DiffFingerprint;
pub use inline::{inline_changes, InlineChange, InlineTag};
