use crate::digest::digest_hex;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Seconds since the Unix epoch, as stored in the metadata tables.
pub fn now_timestamp() -> f64 {
    let now = Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}

/// Converts a stored timestamp back into a `DateTime` for display.
pub fn to_datetime(timestamp: f64) -> DateTime<Utc> {
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1_000_000_000.0) as u32;
    Utc.timestamp_opt(secs as i64, nanos)
        .single()
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub hash: String,
    pub size: u64,
    pub mtime: f64,
}

/// Full state of a tracked tree: root-relative, forward-slash path to entry.
///
/// Serializes as a plain JSON object with sorted keys, which makes the
/// snapshot itself content-addressable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    entries: BTreeMap<String, SnapshotEntry>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&SnapshotEntry> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn insert(&mut self, path: String, entry: SnapshotEntry) -> Option<SnapshotEntry> {
        self.entries.insert(path, entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SnapshotEntry)> {
        self.entries.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

impl FromIterator<(String, SnapshotEntry)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, SnapshotEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Snapshot {
    type Item = (String, SnapshotEntry);
    type IntoIter = std::collections::btree_map::IntoIter<String, SnapshotEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A recorded snapshot on a branch.
///
/// The id is derived from `(branch, timestamp, message, snapshot)` rather
/// than from the parent chain, and merge commits keep a single parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub branch: String,
    pub parent_id: Option<String>,
    pub timestamp: f64,
    pub message: String,
    pub author: String,
    pub snapshot: String,
}

impl Commit {
    pub fn new(
        branch: String,
        parent_id: Option<String>,
        message: String,
        author: String,
        snapshot: String,
    ) -> Self {
        let timestamp = now_timestamp();
        Self {
            id: Self::compute_id(&branch, timestamp, &message, &snapshot),
            branch,
            parent_id,
            timestamp,
            message,
            author,
            snapshot,
        }
    }

    pub fn compute_id(branch: &str, timestamp: f64, message: &str, snapshot: &str) -> String {
        digest_hex(format!("{}:{}:{}:{}", branch, timestamp, message, snapshot).as_bytes())
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        to_datetime(self.timestamp)
    }

    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(8)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub head_commit: Option<String>,
    pub created_at: f64,
    pub description: String,
}

impl Branch {
    pub fn new(name: String, head_commit: Option<String>, description: String) -> Self {
        Self {
            name,
            head_commit,
            created_at: now_timestamp(),
            description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub commit_id: String,
    pub created_at: f64,
    pub description: String,
}

impl Tag {
    pub fn new(name: String, commit_id: String, description: String) -> Self {
        Self {
            name,
            commit_id,
            created_at: now_timestamp(),
            description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: i64,
    pub commit_id: String,
    pub file_path: String,
    pub line_number: Option<u32>,
    pub content: String,
    pub created_at: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStats {
    pub commits: usize,
    pub branches: usize,
    pub tags: usize,
    pub annotations: usize,
    pub objects: usize,
    pub storage_bytes: u64,
}
