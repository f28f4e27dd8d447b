use glossa_diff::{DiffFingerprint, ModifiedKey};
use glossa_types::{KeyIdentity, LanguageValues};
use serde::{Deserialize, Serialize};

/// How to settle one conflicted key.
///
/// On the wire: `"source"`, `"target"`, or `{"explicit": {"en": "..."}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Overwrite the target with the source for every differing language.
    /// Languages the source lacks are removed from the target.
    #[serde(rename = "source")]
    UseSource,
    /// Keep the target as it is.
    #[serde(rename = "target")]
    UseTarget,
    /// Write exactly these values. Differing languages not listed keep the
    /// target's value.
    #[serde(rename = "explicit")]
    Explicit(LanguageValues),
}

/// A resolution bound to a key identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyResolution {
    #[serde(flatten)]
    pub key: KeyIdentity,
    pub resolution: Resolution,
}

impl KeyResolution {
    pub fn new(key: KeyIdentity, resolution: Resolution) -> Self {
        Self { key, resolution }
    }
}

/// Caller input for [`crate::MergeEngine::merge`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    #[serde(default)]
    pub resolutions: Vec<KeyResolution>,
    /// Fingerprint of the diff the resolutions were chosen against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_fingerprint: Option<DiffFingerprint>,
}

impl MergeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(mut self, key: KeyIdentity, resolution: Resolution) -> Self {
        self.resolutions.push(KeyResolution::new(key, resolution));
        self
    }

    pub fn expecting(mut self, fingerprint: DiffFingerprint) -> Self {
        self.expected_fingerprint = Some(fingerprint);
        self
    }
}

/// An unresolved key: its identity and the differing per-language values.
pub type Conflict = ModifiedKey;

/// Counts reported by a successful merge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSummary {
    /// Keys whose stored content changed.
    pub applied_count: usize,
    /// Keys created in the target.
    pub added: usize,
    /// Existing target keys whose values changed.
    pub updated: usize,
}

/// Outcome of a merge that did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeResult {
    Applied(MergeSummary),
    /// Nothing was written.
    Conflicted(Vec<Conflict>),
}

impl MergeResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn conflicts(&self) -> &[Conflict] {
        match self {
            Self::Applied(_) => &[],
            Self::Conflicted(conflicts) => conflicts,
        }
    }

    pub fn applied_count(&self) -> Option<usize> {
        match self {
            Self::Applied(summary) => Some(summary.applied_count),
            Self::Conflicted(_) => None,
        }
    }
}
