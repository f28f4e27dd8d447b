//! Word-level change hints for a single modified value.
//!
//! Uses the `similar` crate (Myers diff algorithm) over word tokens. The hints
//! describe how the target value would turn into the source value.

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineTag {
    /// Text shared by both values.
    Equal,
    /// Text only the source has.
    Insert,
    /// Text only the target has.
    Delete,
}

/// A run of text with one tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineChange {
    pub tag: InlineTag,
    pub text: String,
}

/// Compare `target` against `source` word by word.
///
/// Adjacent tokens with the same tag are merged into one run, so
/// concatenating the `Equal` and `Delete` runs yields `target`, and the
/// `Equal` and `Insert` runs yield `source`.
pub fn inline_changes(source: &str, target: &str) -> Vec<InlineChange> {
    let text_diff = TextDiff::from_words(target, source);

    let mut runs: Vec<InlineChange> = Vec::new();
    for change in text_diff.iter_all_changes() {
        let tag = match change.tag() {
            ChangeTag::Equal => InlineTag::Equal,
            ChangeTag::Insert => InlineTag::Insert,
            ChangeTag::Delete => InlineTag::Delete,
        };
        match runs.last_mut() {
            Some(last) if last.tag == tag => last.text.push_str(change.value()),
            _ => runs.push(InlineChange {
                tag,
                text: change.value().to_string(),
            }),
        }
    }
    runs
}
