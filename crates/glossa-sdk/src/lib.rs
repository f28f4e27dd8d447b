//! High-level SDK for Glossa.
//!
//! [`Glossa`] is the main entry point for applications embedding Glossa. It
//! wires the branch store, diff engine and merge engine to the collaborators
//! the core does not own: project authorization, event delivery and the
//! environment registry.

pub mod access;
pub mod content;
pub mod error;
pub mod events;
pub mod glossa;

pub use access::{AccessDenied, AllowAll, ProjectAccess, Role, StaticAccessList};
pub use content::KeyEntry;
pub use error::{ErrorClass, GlossaError, GlossaResult};
pub use events::{BranchEvent, EventSink, NoopEventSink, RecordingEventSink, TracingEventSink};
pub use glossa::{Glossa, GlossaBuilder};

// Re-export key types
pub use glossa_branch::{CreateBranch, EnvironmentRegistry, InMemoryEnvironments, NoEnvironments};
pub use glossa_diff::{
    inline_changes, BranchDiff, DiffFingerprint, DiffStats, InlineChange, InlineTag,
};
pub use glossa_merge::{
    Conflict, KeyResolution, MergeRequest, MergeResult, MergeSummary, Resolution,
};
pub use glossa_store::{SqliteStore, StoreConfig};
pub use glossa_types::{
    Branch, BranchId, KeyIdentity, KeyRecord, ProjectId, Space, SpaceId, UserId,
};
