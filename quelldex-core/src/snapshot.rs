//! Scanning, snapshotting and restoring the working tree.
//!
//! [`Scanner`] walks the tree below a root, skipping directories matched by
//! its [`IgnoreRules`] and never following symlinks. It offers three views of
//! the tree:
//!
//! - [`Scanner::list_tracked_files`]: the ordered list of tracked paths
//! - [`Scanner::fast_index`]: a stat-only index used for change detection
//! - [`Scanner::full_snapshot`]: reads and stores every file (expensive)
//!
//! Problems that do not stop a scan (an unreadable directory, a file that
//! vanished mid-walk, an object missing during restore) are returned as
//! [`Warning`]s next to the result instead of being dropped silently.
//!
//! A `Scanner` holds no repository state, so it can be cloned into a
//! background thread for read-only scans.

use crate::config::IgnoreRules;
use crate::digest::digest_hex;
use crate::error::Result;
use crate::models::{Snapshot, SnapshotEntry};
use crate::objects::ObjectStore;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Two mtimes closer than this are considered equal.
pub const MTIME_EPSILON: f64 = 0.001;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A directory or entry could not be read during a walk.
    Unreadable { path: PathBuf, message: String },
    /// A tracked file could not be read or stat'ed.
    UnreadableFile { path: String, message: String },
    /// A snapshot entry references an object the store does not have.
    MissingObject { path: String, digest: String },
    /// A snapshot entry would resolve outside the repository root.
    UnsafePath { path: String },
    /// A commit's snapshot object is missing or unreadable.
    MissingSnapshot { commit_id: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Unreadable { path, message } => {
                write!(f, "skipped unreadable entry {}: {}", path.display(), message)
            }
            Warning::UnreadableFile { path, message } => {
                write!(f, "skipped unreadable file {}: {}", path, message)
            }
            Warning::MissingObject { path, digest } => {
                write!(f, "object {} for {} is missing from the store", digest, path)
            }
            Warning::UnsafePath { path } => write!(f, "refused to write unsafe path {}", path),
            Warning::MissingSnapshot { commit_id } => {
                write!(f, "snapshot of commit {} is missing or corrupt", commit_id)
            }
        }
    }
}

/// A scan result together with the non-fatal problems met along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Scanned<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Scanned<T> {
    pub fn into_value(self) -> T {
        self.value
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileStat {
    pub mtime: f64,
    pub size: u64,
}

impl FileStat {
    fn from_metadata(metadata: &fs::Metadata) -> Self {
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        Self {
            mtime,
            size: metadata.len(),
        }
    }

    /// Heuristic equality: same size and mtime within [`MTIME_EPSILON`].
    pub fn matches(&self, entry: &SnapshotEntry) -> bool {
        (entry.mtime - self.mtime).abs() < MTIME_EPSILON && entry.size == self.size
    }
}

/// How [`Scanner::working_changes`] decides whether a file was modified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChangeDetection {
    /// Compare mtime and size only. Fast, but an edit that keeps both goes
    /// unnoticed and a touched file is reported as modified.
    #[default]
    Heuristic,
    /// Re-hash every file present in the baseline and compare digests.
    Verify,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedFile {
    pub old: SnapshotEntry,
    pub new: FileStat,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingChanges {
    pub added: BTreeMap<String, FileStat>,
    pub modified: BTreeMap<String, ModifiedFile>,
    pub removed: BTreeMap<String, SnapshotEntry>,
}

impl WorkingChanges {
    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_clean()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreReport {
    pub written: usize,
    pub removed: usize,
    pub warnings: Vec<Warning>,
}

impl RestoreReport {
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    ignore: IgnoreRules,
}

impl Scanner {
    pub fn new<P: Into<PathBuf>>(root: P, ignore: IgnoreRules) -> Self {
        Self {
            root: root.into(),
            ignore,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ignore_rules(&self) -> &IgnoreRules {
        &self.ignore
    }

    /// Root-relative, forward-slash paths of every tracked file, sorted.
    pub fn list_tracked_files(&self) -> Scanned<Vec<String>> {
        let (files, warnings) = self.walk();
        Scanned {
            value: files.into_iter().map(|(rel, _)| rel).collect(),
            warnings,
        }
    }

    /// Stat-only index of the tree. Never reads file content.
    pub fn fast_index(&self) -> Scanned<BTreeMap<String, FileStat>> {
        let (files, mut warnings) = self.walk();
        let mut index = BTreeMap::new();

        for (rel, entry) in files {
            match entry.metadata() {
                Ok(metadata) => {
                    index.insert(rel, FileStat::from_metadata(&metadata));
                }
                Err(e) => warnings.push(Warning::UnreadableFile {
                    path: rel,
                    message: e.to_string(),
                }),
            }
        }

        Scanned {
            value: index,
            warnings,
        }
    }

    /// Reads every tracked file, stores its content and records its entry.
    ///
    /// Cost is proportional to the total size of the tree; this is the path
    /// taken at commit time.
    pub fn full_snapshot(&self, store: &ObjectStore) -> Result<Scanned<Snapshot>> {
        let (files, mut warnings) = self.walk();
        let mut snapshot = Snapshot::new();

        for (rel, entry) in files {
            let content = match fs::read(entry.path()) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping unreadable file {}: {}", rel, e);
                    warnings.push(Warning::UnreadableFile {
                        path: rel,
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            let mtime = match fs::symlink_metadata(entry.path()) {
                Ok(metadata) => FileStat::from_metadata(&metadata).mtime,
                Err(e) => {
                    warnings.push(Warning::UnreadableFile {
                        path: rel,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let hash = store.store(&content)?;
            snapshot.insert(
                rel,
                SnapshotEntry {
                    hash,
                    size: content.len() as u64,
                    mtime,
                },
            );
        }

        debug!("Snapshot of {:?}: {} files", self.root, snapshot.len());
        Ok(Scanned {
            value: snapshot,
            warnings,
        })
    }

    /// Compares the working tree against `baseline`.
    ///
    /// With [`ChangeDetection::Heuristic`] a file whose size or mtime differs
    /// is reported as modified without reading it.
    pub fn working_changes(
        &self,
        baseline: &Snapshot,
        detection: ChangeDetection,
    ) -> Scanned<WorkingChanges> {
        let Scanned {
            value: index,
            mut warnings,
        } = self.fast_index();
        let mut changes = WorkingChanges::default();

        for (rel, stat) in &index {
            let Some(old) = baseline.get(rel) else {
                changes.added.insert(rel.clone(), *stat);
                continue;
            };

            let modified = match detection {
                ChangeDetection::Heuristic => !stat.matches(old),
                ChangeDetection::Verify => match fs::read(self.root.join(rel)) {
                    Ok(content) => digest_hex(&content) != old.hash,
                    Err(e) => {
                        warnings.push(Warning::UnreadableFile {
                            path: rel.clone(),
                            message: e.to_string(),
                        });
                        true
                    }
                },
            };

            if modified {
                changes.modified.insert(
                    rel.clone(),
                    ModifiedFile {
                        old: old.clone(),
                        new: *stat,
                    },
                );
            }
        }

        for (rel, entry) in baseline.iter() {
            if !index.contains_key(rel) {
                changes.removed.insert(rel.clone(), entry.clone());
            }
        }

        Scanned {
            value: changes,
            warnings,
        }
    }

    /// Makes the working tree match `snapshot`.
    ///
    /// Tracked files absent from the snapshot are deleted, then every entry is
    /// written from the object store. This is destructive and does not check
    /// for uncommitted work: callers must consult
    /// [`working_changes`](Self::working_changes) first.
    pub fn restore_snapshot(&self, store: &ObjectStore, snapshot: &Snapshot) -> Result<RestoreReport> {
        let (files, warnings) = self.walk();
        let mut report = RestoreReport {
            warnings,
            ..RestoreReport::default()
        };

        for (rel, entry) in files {
            if snapshot.contains(&rel) {
                continue;
            }
            fs::remove_file(entry.path())?;
            report.removed += 1;

            if let Some(parent) = entry.path().parent() {
                if parent != self.root {
                    // Only succeeds when the directory became empty.
                    let _ = fs::remove_dir(parent);
                }
            }
        }

        for (rel, entry) in snapshot.iter() {
            let Some(target) = self.resolve(rel) else {
                warn!("Refusing to restore unsafe path {:?}", rel);
                report.warnings.push(Warning::UnsafePath { path: rel.clone() });
                continue;
            };

            let Some(content) = store.read(&entry.hash)? else {
                warn!("Object {} for {} is missing", entry.hash, rel);
                report.warnings.push(Warning::MissingObject {
                    path: rel.clone(),
                    digest: entry.hash.clone(),
                });
                continue;
            };

            if !self.clear_for_write(Path::new(rel))? {
                warn!("Refusing to restore {:?} through a symlinked directory", rel);
                report.warnings.push(Warning::UnsafePath { path: rel.clone() });
                continue;
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, content)?;
            report.written += 1;
        }

        debug!(
            "Restored {:?}: {} written, {} removed, {} warnings",
            self.root,
            report.written,
            report.removed,
            report.warnings.len()
        );
        Ok(report)
    }

    fn walk(&self) -> (Vec<(String, DirEntry)>, Vec<Warning>) {
        let mut files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || !self.ignore.is_ignored(&e.file_name().to_string_lossy())
            });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    if let Some(rel) = self.relative(entry.path()) {
                        files.push((rel, entry));
                    }
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
                    debug!("Skipping unreadable entry {:?}: {}", path, e);
                    warnings.push(Warning::Unreadable {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }

        files.sort_by(|a, b| a.0.cmp(&b.0));
        (files, warnings)
    }

    fn relative(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        Some(parts.join("/"))
    }

    /// Checks every component of `rel` below the root without following
    /// links. A symlink at the target itself is removed so the write lands
    /// in the tree; a symlinked ancestor makes the path unwritable.
    fn clear_for_write(&self, rel: &Path) -> io::Result<bool> {
        let mut current = self.root.clone();
        let mut components = rel.components().peekable();

        while let Some(component) = components.next() {
            current.push(component);
            let metadata = match fs::symlink_metadata(&current) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
                Err(e) => return Err(e),
            };

            if metadata.file_type().is_symlink() {
                if components.peek().is_some() {
                    return Ok(false);
                }
                debug!("Replacing symlink at {:?}", current);
                fs::remove_file(&current)?;
            }
        }

        Ok(true)
    }

    /// Maps a snapshot key to a path below the root, rejecting keys that
    /// are absolute or climb out with `..`.
    fn resolve(&self, rel: &str) -> Option<PathBuf> {
        let rel_path = Path::new(rel);
        let safe = !rel.is_empty()
            && rel_path
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        safe.then(|| self.root.join(rel_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Scanner, ObjectStore) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("project");
        fs::create_dir_all(&root).unwrap();
        let scanner = Scanner::new(&root, IgnoreRules::default());
        let store = ObjectStore::new(dir.path().join("objects"));
        (dir, scanner, store)
    }

    fn write(scanner: &Scanner, rel: &str, content: &str) {
        let path = scanner.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_list_tracked_files_skips_ignored_dirs() {
        let (_dir, scanner, _store) = setup();
        write(&scanner, "src/main.rs", "fn main() {}");
        write(&scanner, "README.md", "# readme");
        write(&scanner, "node_modules/pkg/index.js", "x");
        write(&scanner, ".git/config", "x");
        write(&scanner, "target/debug/out", "x");

        let files = scanner.list_tracked_files();
        assert_eq!(files.value, vec!["README.md", "src/main.rs"]);
        assert!(files.warnings.is_empty());
    }

    #[test]
    fn test_custom_ignore_rules() {
        let (_dir, scanner, _store) = setup();
        write(&scanner, "keep/a.txt", "a");
        write(&scanner, "generated_1/b.txt", "b");
        write(&scanner, "target/c.txt", "c");

        let scanner = Scanner::new(
            scanner.root(),
            IgnoreRules::none().with_predicate(|name| name.starts_with("generated")),
        );

        let files = scanner.list_tracked_files().into_value();
        assert_eq!(files, vec!["keep/a.txt", "target/c.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_dirs_not_followed() {
        let (dir, scanner, _store) = setup();
        let outside = dir.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("secret.txt"), "s").unwrap();
        std::os::unix::fs::symlink(&outside, scanner.root().join("link")).unwrap();
        write(&scanner, "a.txt", "a");

        assert_eq!(scanner.list_tracked_files().value, vec!["a.txt"]);
    }

    #[test]
    fn test_missing_root_reports_warning() {
        let dir = TempDir::new().unwrap();
        let scanner = Scanner::new(dir.path().join("nope"), IgnoreRules::default());

        let files = scanner.list_tracked_files();
        assert!(files.value.is_empty());
        assert_eq!(files.warnings.len(), 1);
    }

    #[test]
    fn test_full_snapshot_stores_content() {
        let (_dir, scanner, store) = setup();
        write(&scanner, "x.txt", "hello");
        write(&scanner, "dir/y.txt", "world!");

        let snapshot = scanner.full_snapshot(&store).unwrap().into_value();
        assert_eq!(snapshot.len(), 2);

        let x = snapshot.get("x.txt").unwrap();
        assert_eq!(x.hash, digest_hex(b"hello"));
        assert_eq!(x.size, 5);
        assert_eq!(store.read(&x.hash).unwrap().unwrap(), b"hello");
        assert_eq!(snapshot.get("dir/y.txt").unwrap().size, 6);
    }

    #[test]
    fn test_working_changes_classification() {
        let (_dir, scanner, store) = setup();
        write(&scanner, "keep.txt", "same");
        write(&scanner, "edit.txt", "before");
        write(&scanner, "gone.txt", "bye");
        let baseline = scanner.full_snapshot(&store).unwrap().into_value();

        write(&scanner, "edit.txt", "after, and longer");
        write(&scanner, "new.txt", "fresh");
        fs::remove_file(scanner.root().join("gone.txt")).unwrap();

        let changes = scanner
            .working_changes(&baseline, ChangeDetection::Heuristic)
            .into_value();

        assert_eq!(changes.added.keys().collect::<Vec<_>>(), vec!["new.txt"]);
        assert_eq!(changes.modified.keys().collect::<Vec<_>>(), vec!["edit.txt"]);
        assert_eq!(changes.removed.keys().collect::<Vec<_>>(), vec!["gone.txt"]);
        assert_eq!(changes.len(), 3);
    }

    #[test]
    fn test_working_changes_clean_after_snapshot() {
        let (_dir, scanner, store) = setup();
        write(&scanner, "a.txt", "a");
        let baseline = scanner.full_snapshot(&store).unwrap().into_value();

        let changes = scanner.working_changes(&baseline, ChangeDetection::Heuristic);
        assert!(changes.value.is_clean());
    }

    #[test]
    fn test_verify_catches_same_size_same_mtime_edit() {
        let (_dir, scanner, store) = setup();
        write(&scanner, "a.txt", "hello");
        let baseline = scanner.full_snapshot(&store).unwrap().into_value();
        let mtime = FileTime::from_unix_time(1_600_000_000, 0);
        let path = scanner.root().join("a.txt");

        fs::write(&path, "jello").unwrap();
        filetime::set_file_mtime(&path, mtime).unwrap();
        let mut baseline = baseline;
        let mut entry = baseline.get("a.txt").unwrap().clone();
        entry.mtime = 1_600_000_000.0;
        baseline.insert("a.txt".to_string(), entry);

        let heuristic = scanner.working_changes(&baseline, ChangeDetection::Heuristic);
        assert!(heuristic.value.is_clean());

        let verified = scanner.working_changes(&baseline, ChangeDetection::Verify);
        assert!(verified.value.modified.contains_key("a.txt"));
    }

    #[test]
    fn test_verify_ignores_touch() {
        let (_dir, scanner, store) = setup();
        write(&scanner, "a.txt", "hello");
        let baseline = scanner.full_snapshot(&store).unwrap().into_value();
        filetime::set_file_mtime(
            scanner.root().join("a.txt"),
            FileTime::from_unix_time(1_000_000_000, 0),
        )
        .unwrap();

        let heuristic = scanner.working_changes(&baseline, ChangeDetection::Heuristic);
        assert!(heuristic.value.modified.contains_key("a.txt"));

        let verified = scanner.working_changes(&baseline, ChangeDetection::Verify);
        assert!(verified.value.is_clean());
    }

    #[test]
    fn test_restore_snapshot() {
        let (_dir, scanner, store) = setup();
        write(&scanner, "a.txt", "original");
        write(&scanner, "nested/b.txt", "b");
        let snapshot = scanner.full_snapshot(&store).unwrap().into_value();

        write(&scanner, "a.txt", "changed");
        fs::remove_file(scanner.root().join("nested/b.txt")).unwrap();
        write(&scanner, "extra/c.txt", "c");

        let report = scanner.restore_snapshot(&store, &snapshot).unwrap();
        assert!(report.is_complete());
        assert_eq!(report.written, 2);
        assert_eq!(report.removed, 1);

        let root = scanner.root();
        assert_eq!(fs::read_to_string(root.join("a.txt")).unwrap(), "original");
        assert_eq!(fs::read_to_string(root.join("nested/b.txt")).unwrap(), "b");
        assert!(!root.join("extra/c.txt").exists());
        assert!(!root.join("extra").exists());
    }

    #[test]
    fn test_restore_reports_missing_objects_and_unsafe_paths() {
        let (_dir, scanner, store) = setup();
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            "lost.txt".to_string(),
            SnapshotEntry {
                hash: "0123456789abcdef".to_string(),
                size: 1,
                mtime: 0.0,
            },
        );
        snapshot.insert(
            "../escape.txt".to_string(),
            SnapshotEntry {
                hash: store.store(b"x").unwrap(),
                size: 1,
                mtime: 0.0,
            },
        );

        let report = scanner.restore_snapshot(&store, &snapshot).unwrap();
        assert_eq!(report.written, 0);
        assert!(report.warnings.contains(&Warning::MissingObject {
            path: "lost.txt".to_string(),
            digest: "0123456789abcdef".to_string(),
        }));
        assert!(report.warnings.contains(&Warning::UnsafePath {
            path: "../escape.txt".to_string(),
        }));
        assert!(!scanner.root().join("lost.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_restore_replaces_symlinked_file() {
        let (dir, scanner, store) = setup();
        let outside = dir.path().join("outside.txt");
        fs::write(&outside, "precious").unwrap();
        std::os::unix::fs::symlink(&outside, scanner.root().join("x.txt")).unwrap();

        let mut snapshot = Snapshot::new();
        snapshot.insert(
            "x.txt".to_string(),
            SnapshotEntry {
                hash: store.store(b"restored").unwrap(),
                size: 8,
                mtime: 0.0,
            },
        );

        let report = scanner.restore_snapshot(&store, &snapshot).unwrap();
        assert!(report.is_complete());
        assert_eq!(report.written, 1);

        let target = scanner.root().join("x.txt");
        assert!(!fs::symlink_metadata(&target).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&target).unwrap(), "restored");
        assert_eq!(fs::read_to_string(&outside).unwrap(), "precious");
    }

    #[cfg(unix)]
    #[test]
    fn test_restore_refuses_symlinked_parent_dir() {
        let (dir, scanner, store) = setup();
        let outside = dir.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, scanner.root().join("sub")).unwrap();

        let mut snapshot = Snapshot::new();
        snapshot.insert(
            "sub/y.txt".to_string(),
            SnapshotEntry {
                hash: store.store(b"y").unwrap(),
                size: 1,
                mtime: 0.0,
            },
        );

        let report = scanner.restore_snapshot(&store, &snapshot).unwrap();
        assert_eq!(report.written, 0);
        assert_eq!(
            report.warnings,
            vec![Warning::UnsafePath {
                path: "sub/y.txt".to_string(),
            }]
        );
        assert!(!outside.join("y.txt").exists());
    }
}
