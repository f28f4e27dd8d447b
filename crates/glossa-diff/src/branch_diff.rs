//! Branch-level diff: compare the key sets of two branches.
//!
//! Each side is a [`BranchContent`]: keys by identity, each with a map of
//! language to value. The diff reads as "what the source has that the target
//! does not": `added` keys exist only in the source, `deleted` keys only in the
//! target, and `modified` keys exist in both with at least one differing
//! language.

use std::collections::BTreeMap;

use glossa_store::{BranchContent, KeyContent};
use glossa_types::{KeyIdentity, LanguageValues};
use serde::{Deserialize, Serialize};

use crate::fingerprint::DiffFingerprint;

/// The categorized difference between a source and a target branch.
///
/// Every bucket is sorted by [`KeyIdentity`]; language maps are sorted by
/// code. Identical keys appear in no bucket.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchDiff {
    pub added: Vec<AddedKey>,
    pub modified: Vec<ModifiedKey>,
    pub deleted: Vec<DeletedKey>,
}

/// A key present in the source but not in the target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedKey {
    #[serde(flatten)]
    pub identity: KeyIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub values: LanguageValues,
}

/// A key present in the target but not in the source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedKey {
    #[serde(flatten)]
    pub identity: KeyIdentity,
    pub values: LanguageValues,
}

/// A key present on both sides whose values differ.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifiedKey {
    #[serde(flatten)]
    pub identity: KeyIdentity,
    /// Only the differing languages.
    pub languages: BTreeMap<String, LanguageChange>,
}

/// One language of a modified key. `None` means the side has no value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageChange {
    pub source_value: Option<String>,
    pub target_value: Option<String>,
}

/// Per-bucket counts of a [`BranchDiff`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffStats {
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
    /// Differing languages across all modified keys.
    pub changed_languages: usize,
}

impl BranchDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the branches hold identical content.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    /// Total number of entries across all buckets.
    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len()
    }

    pub fn stats(&self) -> DiffStats {
        DiffStats {
            added: self.added.len(),
            modified: self.modified.len(),
            deleted: self.deleted.len(),
            changed_languages: self.modified.iter().map(|m| m.languages.len()).sum(),
        }
    }

    /// Digest of the canonical JSON form.
    pub fn fingerprint(&self) -> DiffFingerprint {
        let serialized = serde_json::to_vec(self).unwrap_or_default();
        DiffFingerprint::of_bytes(&serialized)
    }

    pub fn find_modified(&self, identity: &KeyIdentity) -> Option<&ModifiedKey> {
        self.modified
            .binary_search_by(|m| m.identity.cmp(identity))
            .ok()
            .map(|idx| &self.modified[idx])
    }
}

impl ModifiedKey {
    /// Source values of the differing languages that the source defines.
    pub fn source_values(&self) -> LanguageValues {
        self.languages
            .iter()
            .filter_map(|(lang, change)| Some((lang.clone(), change.source_value.clone()?)))
            .collect()
    }
}

/// Compute the diff from `source` to `target`.
///
/// Pure: the result depends only on the two contents. Row ids and key
/// descriptions do not take part in the comparison.
///
/// A key with zero translations on one side counts as absent there, so it
/// lands in `added` or `deleted`, never in `modified`.
pub fn diff_contents(source: &BranchContent, target: &BranchContent) -> BranchDiff {
    let mut diff = BranchDiff::new();

    for (identity, src) in &source.keys {
        match target.keys.get(identity) {
            Some(tgt) if src.values.is_empty() || tgt.values.is_empty() => {
                if tgt.values.is_empty() && !src.values.is_empty() {
                    diff.added.push(added_key(identity, src));
                }
            }
            Some(tgt) => {
                let languages = diff_languages(&src.values, &tgt.values);
                if !languages.is_empty() {
                    diff.modified.push(ModifiedKey {
                        identity: identity.clone(),
                        languages,
                    });
                }
            }
            None => diff.added.push(added_key(identity, src)),
        }
    }

    for (identity, tgt) in &target.keys {
        let absent_in_source = source
            .keys
            .get(identity)
            .map_or(true, |src| src.values.is_empty() && !tgt.values.is_empty());
        if absent_in_source {
            diff.deleted.push(DeletedKey {
                identity: identity.clone(),
                values: tgt.values.clone(),
            });
        }
    }

    diff
}

fn added_key(identity: &KeyIdentity, src: &KeyContent) -> AddedKey {
    AddedKey {
        identity: identity.clone(),
        description: src.description.clone(),
        values: src.values.clone(),
    }
}

fn diff_languages(
    source: &LanguageValues,
    target: &LanguageValues,
) -> BTreeMap<String, LanguageChange> {
    let mut languages = BTreeMap::new();

    for (lang, src) in source {
        let tgt = target.get(lang);
        if tgt != Some(src) {
            languages.insert(
                lang.clone(),
                LanguageChange {
                    source_value: Some(src.clone()),
                    target_value: tgt.cloned(),
                },
            );
        }
    }
    for (lang, tgt) in target {
        if !source.contains_key(lang) {
            languages.insert(
                lang.clone(),
                LanguageChange {
                    source_value: None,
                    target_value: Some(tgt.clone()),
                },
            );
        }
    }

    languages
}
