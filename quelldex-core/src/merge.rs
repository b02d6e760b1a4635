//! Last-writer-wins union of two snapshots.
//!
//! Every path of the source snapshot ends up in the result. When both sides
//! hold a path with different content the source version wins and the path
//! is reported as a conflict; conflicts are informational and never block a
//! merge. No line-level merge is attempted.

use crate::models::Snapshot;
use crate::snapshot::Warning;
use serde::Serialize;
use std::fmt;

/// Result of [`merge_snapshots`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergedSnapshot {
    pub snapshot: Snapshot,
    pub conflicts: Vec<String>,
}

pub fn merge_snapshots(target: &Snapshot, source: &Snapshot) -> MergedSnapshot {
    let mut merged = target.clone();
    let mut conflicts = Vec::new();

    for (path, entry) in source.iter() {
        match target.get(path) {
            Some(existing) if existing.hash == entry.hash => continue,
            Some(_) => conflicts.push(path.clone()),
            None => {}
        }
        merged.insert(path.clone(), entry.clone());
    }

    MergedSnapshot {
        snapshot: merged,
        conflicts,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeReport {
    /// Commit recording the merge on the current branch. `None` when the
    /// merged tree turned out empty and nothing could be committed.
    pub commit_id: Option<String>,
    pub conflicts: Vec<String>,
    /// Number of entries in the source snapshot.
    pub files_merged: usize,
    #[serde(skip)]
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MergeRefusal {
    NoCurrentBranch,
    SameBranch,
    UnknownBranch,
    SourceHasNoCommits,
}

impl fmt::Display for MergeRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            MergeRefusal::NoCurrentBranch => "no current branch",
            MergeRefusal::SameBranch => "cannot merge a branch into itself",
            MergeRefusal::UnknownBranch => "source branch does not exist",
            MergeRefusal::SourceHasNoCommits => "source branch has no commits",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    Merged(MergeReport),
    Refused(MergeRefusal),
}
