//! Foundation types for Glossa.
//!
//! This crate provides the identifiers and records shared by every other
//! Glossa crate. It performs no I/O.
//!
//! # Key Types
//!
//! - [`SpaceId`] / [`BranchId`] / [`KeyId`]: UUID v7 row identifiers
//! - [`ProjectId`] / [`UserId`]: opaque identifiers owned by external systems
//! - [`KeyIdentity`]: the `(namespace, name)` pair that identifies a logical
//!   key across branches
//! - [`Space`] / [`Branch`] / [`KeyRecord`]: persisted records
//! - [`LanguageValues`]: `language -> value` map for one key

pub mod error;
pub mod ids;
pub mod key;
pub mod records;
pub mod slug;

pub use error::TypeError;
pub use ids::{BranchId, KeyId, ProjectId, SpaceId, UserId};
pub use key::{validate_language, KeyIdentity, LanguageValues};
pub use records::{Branch, KeyRecord, Space};
pub use slug::{slugify, validate_slug};
