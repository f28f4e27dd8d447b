use std::collections::BTreeMap;
use std::sync::Arc;

use glossa_diff::{diff_contents, AddedKey, BranchDiff, ModifiedKey};
use glossa_store::{BranchContent, SqliteStore, StoreTx};
use glossa_types::{validate_language, BranchId, KeyId, KeyIdentity, KeyRecord, LanguageValues};

use crate::error::MergeError;
use crate::resolution::{MergeRequest, MergeResult, MergeSummary, Resolution};

/// Merges one branch into another over a [`SqliteStore`].
#[derive(Clone, Debug)]
pub struct MergeEngine {
    store: Arc<SqliteStore>,
}

impl MergeEngine {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    /// Merge `source` into `target`.
    ///
    /// The diff, the conflict check and every write happen in one write
    /// transaction, so the resolutions are always applied to the baseline they
    /// were checked against.
    pub fn merge(
        &self,
        source: BranchId,
        target: BranchId,
        request: &MergeRequest,
    ) -> Result<MergeResult, MergeError> {
        let result = self
            .store
            .write_tx(|tx| Self::merge_in(tx, source, target, request))?;

        match &result {
            MergeResult::Applied(summary) => tracing::info!(
                %source,
                %target,
                applied = summary.applied_count,
                added = summary.added,
                updated = summary.updated,
                "merge applied"
            ),
            MergeResult::Conflicted(conflicts) => tracing::info!(
                %source,
                %target,
                conflicts = conflicts.len(),
                "merge refused with unresolved conflicts"
            ),
        }
        Ok(result)
    }

    /// The body of [`Self::merge`], run inside a caller's transaction.
    pub fn merge_in(
        tx: &StoreTx<'_>,
        source: BranchId,
        target: BranchId,
        request: &MergeRequest,
    ) -> Result<MergeResult, MergeError> {
        if source == target {
            return Err(MergeError::SameBranch(source));
        }
        let source_branch = tx
            .branch(source)?
            .ok_or(MergeError::BranchNotFound(source))?;
        let target_branch = tx
            .branch(target)?
            .ok_or(MergeError::BranchNotFound(target))?;
        if source_branch.space_id != target_branch.space_id {
            return Err(MergeError::CrossSpace {
                source_branch: source,
                target_branch: target,
            });
        }

        let source_content = tx.load_content(source)?;
        let target_content = tx.load_content(target)?;
        let diff = diff_contents(&source_content, &target_content);

        if let Some(expected) = request.expected_fingerprint {
            let actual = diff.fingerprint();
            if actual != expected {
                return Err(MergeError::StaleDiff { expected, actual });
            }
        }

        let resolutions = index_resolutions(request)?;
        let unresolved: Vec<ModifiedKey> = diff
            .modified
            .iter()
            .filter(|entry| !resolutions.contains_key(&entry.identity))
            .cloned()
            .collect();
        if !unresolved.is_empty() {
            return Ok(MergeResult::Conflicted(unresolved));
        }
        for key in resolutions.keys() {
            if diff.find_modified(key).is_none() {
                tracing::debug!(%key, "ignoring resolution for key without conflict");
            }
        }

        let summary = apply(tx, target, &diff, &target_content, &resolutions)?;
        Ok(MergeResult::Applied(summary))
    }
}

fn index_resolutions(
    request: &MergeRequest,
) -> Result<BTreeMap<&KeyIdentity, &Resolution>, MergeError> {
    let mut index = BTreeMap::new();
    for entry in &request.resolutions {
        if let Resolution::Explicit(values) = &entry.resolution {
            for language in values.keys() {
                validate_language(language)?;
            }
        }
        if index.insert(&entry.key, &entry.resolution).is_some() {
            return Err(MergeError::DuplicateResolution(entry.key.clone()));
        }
    }
    Ok(index)
}

fn apply(
    tx: &StoreTx<'_>,
    target: BranchId,
    diff: &BranchDiff,
    target_content: &BranchContent,
    resolutions: &BTreeMap<&KeyIdentity, &Resolution>,
) -> Result<MergeSummary, MergeError> {
    let mut summary = MergeSummary::default();

    for entry in &diff.added {
        insert_added(tx, target, entry)?;
        summary.added += 1;
    }

    for entry in &diff.modified {
        let Some(existing) = target_content.get(&entry.identity) else {
            continue;
        };
        let changed = match resolutions.get(&entry.identity) {
            Some(Resolution::UseSource) => use_source(tx, existing.key_id, entry)?,
            Some(Resolution::Explicit(values)) => {
                write_explicit(tx, existing.key_id, &existing.values, values)?
            }
            Some(Resolution::UseTarget) | None => false,
        };
        if changed {
            summary.updated += 1;
        }
    }

    summary.applied_count = summary.added + summary.updated;
    Ok(summary)
}

/// Add a source-only key to the target. A target row with no translations
/// is reused rather than duplicated.
fn insert_added(tx: &StoreTx<'_>, target: BranchId, entry: &AddedKey) -> Result<(), MergeError> {
    let key_id = match tx.find_key(target, &entry.identity)? {
        Some(existing) => existing.id,
        None => {
            let key = KeyRecord {
                id: KeyId::new(),
                branch_id: target,
                identity: entry.identity.clone(),
                description: entry.description.clone(),
            };
            tx.insert_key(&key)?;
            key.id
        }
    };
    tx.upsert_translations(key_id, &entry.values)?;
    Ok(())
}

/// Make the differing languages match the source.
fn use_source(tx: &StoreTx<'_>, key: KeyId, entry: &ModifiedKey) -> Result<bool, MergeError> {
    let upserts = entry.source_values();
    let removals: Vec<&str> = entry
        .languages
        .iter()
        .filter(|(_, change)| change.source_value.is_none())
        .map(|(language, _)| language.as_str())
        .collect();

    tx.upsert_translations(key, &upserts)?;
    tx.delete_translations(key, removals.iter().copied())?;
    Ok(!upserts.is_empty() || !removals.is_empty())
}

fn write_explicit(
    tx: &StoreTx<'_>,
    key: KeyId,
    current: &LanguageValues,
    values: &LanguageValues,
) -> Result<bool, MergeError> {
    let changes: LanguageValues = values
        .iter()
        .filter(|(language, value)| current.get(*language) != Some(*value))
        .map(|(language, value)| (language.clone(), value.clone()))
        .collect();
    if changes.is_empty() {
        return Ok(false);
    }
    tx.upsert_translations(key, &changes)?;
    Ok(true)
}
