//! Notifications published after a state change commits.

use std::sync::Mutex;

use glossa_types::{BranchId, KeyIdentity, ProjectId, SpaceId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BranchEvent {
    #[serde(rename_all = "camelCase")]
    SpaceCreated {
        space_id: SpaceId,
        project_id: ProjectId,
        default_branch_id: BranchId,
    },
    #[serde(rename_all = "camelCase")]
    BranchCreated {
        branch_id: BranchId,
        space_id: SpaceId,
        source_branch_id: BranchId,
    },
    #[serde(rename_all = "camelCase")]
    BranchDeleted { branch_id: BranchId, space_id: SpaceId },
    #[serde(rename_all = "camelCase")]
    BranchRenamed { branch_id: BranchId, name: String },
    #[serde(rename_all = "camelCase")]
    DefaultBranchChanged { branch_id: BranchId, space_id: SpaceId },
    #[serde(rename_all = "camelCase")]
    MergeApplied {
        source_branch_id: BranchId,
        target_branch_id: BranchId,
        applied_count: usize,
    },
    #[serde(rename_all = "camelCase")]
    KeyChanged {
        branch_id: BranchId,
        key: KeyIdentity,
    },
    #[serde(rename_all = "camelCase")]
    KeyDeleted {
        branch_id: BranchId,
        key: KeyIdentity,
    },
}

/// Receives [`BranchEvent`]s. Called only after the change committed.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &BranchEvent);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn publish(&self, _event: &BranchEvent) {}
}

/// Logs every event at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn publish(&self, event: &BranchEvent) {
        match serde_json::to_string(event) {
            Ok(json) => tracing::info!(event = %json, "branch event"),
            Err(e) => tracing::warn!(error = %e, "unserializable branch event"),
        }
    }
}

/// Keeps events in memory.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<BranchEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BranchEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl EventSink for RecordingEventSink {
    fn publish(&self, event: &BranchEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}
