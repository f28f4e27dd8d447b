//! In-memory image of one branch's translation content.

use std::collections::BTreeMap;

use glossa_types::{BranchId, KeyId, KeyIdentity, LanguageValues};

/// One key and its translations as loaded from a branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyContent {
    pub key_id: KeyId,
    pub description: Option<String>,
    pub values: LanguageValues,
}

/// Every key of a branch, indexed by logical identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchContent {
    pub branch_id: BranchId,
    pub keys: BTreeMap<KeyIdentity, KeyContent>,
}

impl BranchContent {
    /// An empty branch image.
    pub fn empty(branch_id: BranchId) -> Self {
        Self {
            branch_id,
            keys: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, identity: &KeyIdentity) -> Option<&KeyContent> {
        self.keys.get(identity)
    }

    /// Number of stored translation values across all keys.
    pub fn translation_count(&self) -> usize {
        self.keys.values().map(|k| k.values.len()).sum()
    }
}
