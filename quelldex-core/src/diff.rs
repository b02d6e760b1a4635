use crate::models::{Snapshot, SnapshotEntry};
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::collections::BTreeMap;

/// Returned in place of a line diff when either side looks binary.
pub const BINARY_SENTINEL: &str = "[Binary files differ]";

const CONTEXT_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryChange {
    pub old: SnapshotEntry,
    pub new: SnapshotEntry,
}

/// Path-level difference between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotDiff {
    pub added: BTreeMap<String, SnapshotEntry>,
    pub removed: BTreeMap<String, SnapshotEntry>,
    pub modified: BTreeMap<String, EntryChange>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }
}

/// Compares `old` to `new` by path, using digest equality for content.
pub fn diff_snapshots(old: &Snapshot, new: &Snapshot) -> SnapshotDiff {
    let mut diff = SnapshotDiff::default();

    for (path, entry) in new.iter() {
        match old.get(path) {
            None => {
                diff.added.insert(path.clone(), entry.clone());
            }
            Some(previous) if previous.hash != entry.hash => {
                diff.modified.insert(
                    path.clone(),
                    EntryChange {
                        old: previous.clone(),
                        new: entry.clone(),
                    },
                );
            }
            Some(_) => {}
        }
    }

    for (path, entry) in old.iter() {
        if !new.contains(path) {
            diff.removed.insert(path.clone(), entry.clone());
        }
    }

    diff
}

/// Unified line diff of two blobs, one output line per element.
///
/// Invalid UTF-8 is replaced rather than rejected. Content containing NUL
/// bytes is treated as binary and yields [`BINARY_SENTINEL`] alone.
/// Identical inputs produce no lines.
pub fn unified_lines(old: &[u8], new: &[u8], old_label: &str, new_label: &str) -> Vec<String> {
    if old == new {
        return Vec::new();
    }
    if old.contains(&0) || new.contains(&0) {
        return vec![BINARY_SENTINEL.to_string()];
    }

    let old_text = String::from_utf8_lossy(old);
    let new_text = String::from_utf8_lossy(new);
    let diff = TextDiff::from_lines(old_text.as_ref(), new_text.as_ref());

    let mut unified = diff.unified_diff();
    unified.context_radius(CONTEXT_LINES);

    let mut lines = Vec::new();
    for hunk in unified.iter_hunks() {
        if lines.is_empty() {
            lines.push(format!("--- {}", old_label));
            lines.push(format!("+++ {}", new_label));
        }
        lines.push(hunk.header().to_string());

        for change in hunk.iter_changes() {
            let prefix = match change.tag() {
                ChangeTag::Delete => '-',
                ChangeTag::Insert => '+',
                ChangeTag::Equal => ' ',
            };
            let value = change.value().trim_end_matches(['\n', '\r']);
            lines.push(format!("{}{}", prefix, value));
        }
    }

    lines
}
