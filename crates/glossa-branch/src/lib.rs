//! Branch management for Glossa.
//!
//! A space owns a forest of branches. Every branch except the first is forked
//! from another branch of the same space by an eager, full copy of its keys
//! and translations: after the fork the two branches share no rows.
//!
//! # Architecture
//!
//! - **Forks** run in one write transaction. Keys are copied in chunks of
//!   [`glossa_store::StoreConfig::copy_batch_size`], but a failure in any
//!   chunk rolls back the branch row as well.
//! - **Default branch**: each space has exactly one. It is created with the
//!   space, can be moved with [`BranchStore::set_default`], and cannot be
//!   deleted.
//! - **Environments** are owned elsewhere; deletion consults an
//!   [`EnvironmentRegistry`] and refuses while any environment points at the
//!   branch.
//!
//! # Modules
//!
//! - [`error`]: Error types for branch operations
//! - [`environments`]: The [`EnvironmentRegistry`] check and simple registries
//! - [`requests`]: Inputs for creating spaces and branches
//! - [`store`]: [`BranchStore`]

pub mod environments;
pub mod error;
pub mod requests;
pub mod store;

pub use environments::{EnvironmentRegistry, InMemoryEnvironments, NoEnvironments};
pub use error::{BranchError, BranchResult};
pub use requests::{CreateBranch, CreateSpace};
pub use store::BranchStore;
