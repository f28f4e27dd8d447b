//! Merge engine for Glossa.
//!
//! Applies the changes of a source branch onto a target branch. Keys only the
//! source has are copied over; keys whose values differ are conflicts and need
//! a caller-supplied [`Resolution`]; keys only the target has are left alone.
//!
//! A merge either applies completely or writes nothing. When any conflict is
//! unresolved the engine returns [`MergeResult::Conflicted`] without touching
//! the target, so callers can collect resolutions and retry.

pub mod engine;
pub mod error;
pub mod resolution;

pub use engine::MergeEngine;
pub use error::MergeError;
pub use resolution::{
    Conflict, KeyResolution, MergeRequest, MergeResult, MergeSummary, Resolution,
};
