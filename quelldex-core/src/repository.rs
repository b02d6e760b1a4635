//! The repository aggregate.
//!
//! A [`Repository`] owns everything that makes up one repository's state:
//! the object store, the metadata tables and the current-branch register.
//! All version-control operations go through it.
//!
//! ## Layout
//!
//! ```text
//! <root>/
//! └── .quelldex/
//!     ├── config.toml      # optional configuration
//!     ├── meta.db          # commits, branches, current_state, tags, annotations
//!     └── objects/
//!         └── <2 hex>/<14 hex>
//! ```
//!
//! ## Working tree safety
//!
//! [`switch_branch`](Repository::switch_branch),
//! [`merge_branch`](Repository::merge_branch),
//! [`goto_tag`](Repository::goto_tag) and
//! [`restore_commit`](Repository::restore_commit) overwrite the working tree
//! without checking for uncommitted work. Callers are expected to run
//! [`working_changes`](Repository::working_changes) first and warn the user
//! when it is not clean.
//!
//! ## Concurrency
//!
//! Every mutating operation takes `&mut self`, so one `Repository` value
//! serializes its own writes. A clone of [`Repository::scanner`] may be moved
//! to another thread for read-only scans.

use crate::config::{RepoConfig, REPO_DIR};
use crate::diff::{self, SnapshotDiff};
use crate::error::{Error, Result};
use crate::merge::{merge_snapshots, MergeOutcome, MergeRefusal, MergeReport};
use crate::models::{now_timestamp, Annotation, Branch, Commit, RepoStats, Snapshot, Tag};
use crate::objects::ObjectStore;
use crate::snapshot::{ChangeDetection, RestoreReport, Scanned, Scanner, Warning, WorkingChanges};
use crate::storage::{Storage, Table};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_BRANCH: &str = "main";

const DB_FILE: &str = "meta.db";
const OBJECTS_DIR: &str = "objects";
const CONFIG_FILE: &str = "config.toml";

pub struct Repository {
    root: PathBuf,
    config: RepoConfig,
    objects: ObjectStore,
    storage: Storage,
    scanner: Scanner,
    current_branch: Option<String>,
}

impl Repository {
    /// Creates the repository metadata under `root`, or opens it if present.
    ///
    /// A fresh repository gets a `main` branch, which becomes current.
    pub fn init<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::init_with_config(root, RepoConfig::default())
    }

    /// Like [`init`](Self::init), writing `config` if no config file exists.
    pub fn init_with_config<P: AsRef<Path>>(root: P, config: RepoConfig) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let repo_dir = root.join(REPO_DIR);
        fs::create_dir_all(repo_dir.join(OBJECTS_DIR))?;

        let config_path = repo_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            config.save(&config_path)?;
        }

        let mut repo = Self::load(root)?;
        if repo.storage.branches()?.is_empty() {
            let main = Branch::new(DEFAULT_BRANCH.to_string(), None, String::new());
            repo.storage.create_branch(&main)?;
            repo.set_current_branch(DEFAULT_BRANCH)?;
            info!("Initialized repository at {:?}", repo.root);
        }

        Ok(repo)
    }

    /// Opens an existing repository.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !Self::is_initialized(&root) {
            return Err(Error::NotInitialized(root));
        }
        Self::load(root)
    }

    pub fn is_initialized<P: AsRef<Path>>(root: P) -> bool {
        root.as_ref().join(REPO_DIR).join(DB_FILE).is_file()
    }

    fn load(root: PathBuf) -> Result<Self> {
        let repo_dir = root.join(REPO_DIR);
        let config = RepoConfig::load(repo_dir.join(CONFIG_FILE))?;
        let storage = Storage::new(repo_dir.join(DB_FILE))?;
        let current_branch = storage.current_branch()?;

        Ok(Self {
            objects: ObjectStore::new(repo_dir.join(OBJECTS_DIR)),
            scanner: Scanner::new(&root, config.ignore_rules()),
            storage,
            config,
            current_branch,
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    pub fn current_branch(&self) -> Option<&str> {
        self.current_branch.as_deref()
    }

    fn set_current_branch(&mut self, name: &str) -> Result<()> {
        self.storage.set_current_branch(name)?;
        self.current_branch = Some(name.to_string());
        Ok(())
    }

    // Snapshots

    /// Head commit of the current branch, if any.
    pub fn head(&self) -> Result<Option<String>> {
        match &self.current_branch {
            Some(branch) => self.storage.branch_head(branch),
            None => Ok(None),
        }
    }

    /// Changes of the working tree against the current head's snapshot.
    ///
    /// Uses the mtime+size heuristic unless `verify_hashes` is configured.
    pub fn working_changes(&self) -> Result<Scanned<WorkingChanges>> {
        let detection = if self.config.verify_hashes {
            ChangeDetection::Verify
        } else {
            ChangeDetection::Heuristic
        };
        self.working_changes_with(detection)
    }

    pub fn working_changes_with(&self, detection: ChangeDetection) -> Result<Scanned<WorkingChanges>> {
        let baseline = match self.head()? {
            Some(head) => self.get_commit_snapshot(&head)?.unwrap_or_default(),
            None => Snapshot::new(),
        };
        Ok(self.scanner.working_changes(&baseline, detection))
    }

    /// Overwrites the working tree with `snapshot`. See the module docs.
    pub fn restore_snapshot(&mut self, snapshot: &Snapshot) -> Result<RestoreReport> {
        self.scanner.restore_snapshot(&self.objects, snapshot)
    }

    /// Checks out the snapshot of any commit, keeping the current branch.
    ///
    /// Returns `None` if the commit is unknown or its snapshot is unreadable.
    pub fn restore_commit(&mut self, commit_id: &str) -> Result<Option<RestoreReport>> {
        let Some(snapshot) = self.get_commit_snapshot(commit_id)? else {
            return Ok(None);
        };
        let report = self.restore_snapshot(&snapshot)?;
        info!("Restored working tree to commit {}", commit_id);
        Ok(Some(report))
    }

    // Commits

    /// Records the working tree on the current branch.
    ///
    /// Returns `None` without writing metadata when there is no current
    /// branch or nothing is tracked. Objects are written before the commit
    /// row; a crash in between leaves unreferenced but harmless objects.
    pub fn commit(&mut self, message: &str, author: &str) -> Result<Option<String>> {
        let Some(branch) = self.current_branch.clone() else {
            debug!("Commit refused: no current branch");
            return Ok(None);
        };

        let Scanned {
            value: snapshot,
            warnings,
        } = self.scanner.full_snapshot(&self.objects)?;
        for warning in &warnings {
            warn!("{}", warning);
        }
        if snapshot.is_empty() {
            debug!("Commit refused: empty snapshot");
            return Ok(None);
        }

        let snapshot_digest = self.objects.store(&snapshot.to_json()?)?;
        let parent = self.storage.branch_head(&branch)?;
        let commit = Commit::new(
            branch,
            parent,
            message.to_string(),
            author.to_string(),
            snapshot_digest,
        );
        self.storage.record_commit(&commit)?;

        info!(
            "Committed {} on {} ({} files)",
            commit.id,
            commit.branch,
            snapshot.len()
        );
        Ok(Some(commit.id))
    }

    pub fn get_commit(&self, id: &str) -> Result<Option<Commit>> {
        self.storage.get_commit(id)
    }

    /// Snapshot recorded by a commit.
    ///
    /// An unknown commit, a missing snapshot object or unparsable snapshot
    /// data all yield `None`.
    pub fn get_commit_snapshot(&self, id: &str) -> Result<Option<Snapshot>> {
        let Some(commit) = self.storage.get_commit(id)? else {
            return Ok(None);
        };
        let Some(data) = self.objects.read(&commit.snapshot)? else {
            warn!("Snapshot {} of commit {} is missing", commit.snapshot, id);
            return Ok(None);
        };

        match Snapshot::from_json(&data) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                warn!("Snapshot {} of commit {} is corrupt: {}", commit.snapshot, id, e);
                Ok(None)
            }
        }
    }

    /// Commits newest first, across all branches unless `branch` is given.
    pub fn history(&self, branch: Option<&str>, limit: usize) -> Result<Vec<Commit>> {
        self.storage.history(branch, limit)
    }

    // Branches

    pub fn branches(&self) -> Result<Vec<Branch>> {
        self.storage.branches()
    }

    pub fn get_branch(&self, name: &str) -> Result<Option<Branch>> {
        self.storage.get_branch(name)
    }

    pub fn branch_head(&self, name: &str) -> Result<Option<String>> {
        self.storage.branch_head(name)
    }

    /// Forks a branch at the current head. `false` if the name is taken.
    pub fn create_branch(&mut self, name: &str, description: &str) -> Result<bool> {
        if self.storage.get_branch(name)?.is_some() {
            return Ok(false);
        }

        let branch = Branch::new(name.to_string(), self.head()?, description.to_string());
        let created = self.storage.create_branch(&branch)?;
        if created {
            info!("Created branch {} at {:?}", name, branch.head_commit);
        }
        Ok(created)
    }

    /// Makes `name` current, restoring its head snapshot onto the tree.
    ///
    /// Returns `None` for an unknown branch. A branch without commits leaves
    /// the working tree untouched.
    pub fn switch_branch(&mut self, name: &str) -> Result<Option<RestoreReport>> {
        let Some(branch) = self.storage.get_branch(name)? else {
            return Ok(None);
        };

        let mut report = RestoreReport::default();
        if let Some(head) = branch.head_commit {
            match self.get_commit_snapshot(&head)? {
                Some(snapshot) => report = self.restore_snapshot(&snapshot)?,
                None => report.warnings.push(Warning::MissingSnapshot { commit_id: head }),
            }
        }

        self.set_current_branch(name)?;
        info!("Switched to branch {}", name);
        Ok(Some(report))
    }

    /// Removes a branch pointer; its commits stay in history.
    /// Refused for the current branch.
    pub fn delete_branch(&mut self, name: &str) -> Result<bool> {
        if self.current_branch.as_deref() == Some(name) {
            return Ok(false);
        }

        let deleted = self.storage.delete_branch(name)?;
        if deleted {
            info!("Deleted branch {}", name);
        }
        Ok(deleted)
    }

    // Merge

    /// Merges `source` into the current branch and commits the result.
    ///
    /// Paths changed on both sides take the source version and are listed as
    /// conflicts. The merge commit records only the current branch's head as
    /// its parent.
    pub fn merge_branch(&mut self, source: &str, message: Option<&str>) -> Result<MergeOutcome> {
        let Some(target) = self.current_branch.clone() else {
            return Ok(MergeOutcome::Refused(MergeRefusal::NoCurrentBranch));
        };
        if source == target {
            return Ok(MergeOutcome::Refused(MergeRefusal::SameBranch));
        }
        let Some(source_branch) = self.storage.get_branch(source)? else {
            return Ok(MergeOutcome::Refused(MergeRefusal::UnknownBranch));
        };
        let Some(source_head) = source_branch.head_commit else {
            return Ok(MergeOutcome::Refused(MergeRefusal::SourceHasNoCommits));
        };

        let source_snapshot = self.get_commit_snapshot(&source_head)?.unwrap_or_default();
        let target_snapshot = match self.storage.branch_head(&target)? {
            Some(head) => self.get_commit_snapshot(&head)?.unwrap_or_default(),
            None => Snapshot::new(),
        };

        let merged = merge_snapshots(&target_snapshot, &source_snapshot);
        let restore = self.restore_snapshot(&merged.snapshot)?;

        let message = match message {
            Some(message) => message.to_string(),
            None => format!("merge '{}' into '{}'", source, target),
        };
        let author = self.config.default_author.clone();
        let commit_id = self.commit(&message, &author)?;

        info!(
            "Merged {} into {}: {} files, {} conflicts",
            source,
            target,
            source_snapshot.len(),
            merged.conflicts.len()
        );
        Ok(MergeOutcome::Merged(MergeReport {
            commit_id,
            conflicts: merged.conflicts,
            files_merged: source_snapshot.len(),
            warnings: restore.warnings,
        }))
    }

    // Diff

    /// Path-level diff from commit `a` to commit `b`. Unknown commits count
    /// as empty snapshots.
    pub fn diff_commits(&self, a: &str, b: &str) -> Result<SnapshotDiff> {
        let old = self.get_commit_snapshot(a)?.unwrap_or_default();
        let new = self.get_commit_snapshot(b)?.unwrap_or_default();
        Ok(diff::diff_snapshots(&old, &new))
    }

    /// Unified line diff between two stored objects; empty if either is
    /// missing.
    pub fn diff_file_content(&self, digest_a: &str, digest_b: &str) -> Result<Vec<String>> {
        let (Some(old), Some(new)) = (self.objects.read(digest_a)?, self.objects.read(digest_b)?)
        else {
            return Ok(Vec::new());
        };
        Ok(diff::unified_lines(&old, &new, digest_a, digest_b))
    }

    // Tags

    /// Tags `commit_id`, or the current head when `None`.
    ///
    /// Refused for a duplicate name, an unknown commit, or when there is no
    /// head to tag.
    pub fn create_tag(
        &mut self,
        name: &str,
        commit_id: Option<&str>,
        description: &str,
    ) -> Result<bool> {
        let commit_id = match commit_id {
            Some(id) => id.to_string(),
            None => match self.head()? {
                Some(head) => head,
                None => return Ok(false),
            },
        };
        if self.storage.get_commit(&commit_id)?.is_none() {
            return Ok(false);
        }

        let tag = Tag::new(name.to_string(), commit_id, description.to_string());
        let created = self.storage.create_tag(&tag)?;
        if created {
            info!("Tagged {} as {}", tag.commit_id, name);
        }
        Ok(created)
    }

    pub fn get_tag(&self, name: &str) -> Result<Option<Tag>> {
        self.storage.get_tag(name)
    }

    pub fn tags(&self) -> Result<Vec<Tag>> {
        self.storage.tags()
    }

    /// Restores the tagged snapshot without moving the current branch.
    pub fn goto_tag(&mut self, name: &str) -> Result<Option<RestoreReport>> {
        let Some(tag) = self.storage.get_tag(name)? else {
            return Ok(None);
        };
        self.restore_commit(&tag.commit_id)
    }

    // Annotations

    pub fn add_annotation(
        &mut self,
        commit_id: &str,
        file_path: &str,
        content: &str,
        line_number: Option<u32>,
    ) -> Result<i64> {
        self.storage
            .add_annotation(commit_id, file_path, line_number, content, now_timestamp())
    }

    pub fn annotations(
        &self,
        commit_id: Option<&str>,
        file_path: Option<&str>,
    ) -> Result<Vec<Annotation>> {
        self.storage.annotations(commit_id, file_path)
    }

    // Stats

    /// Row counts plus object-store usage. Walks the whole store.
    pub fn stats(&self) -> Result<RepoStats> {
        let usage = self.objects.disk_usage()?;
        Ok(RepoStats {
            commits: self.storage.count(Table::Commits)?,
            branches: self.storage.count(Table::Branches)?,
            tags: self.storage.count(Table::Tags)?,
            annotations: self.storage.count(Table::Annotations)?,
            objects: usage.objects,
            storage_bytes: usage.bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(repo: &Repository, rel: &str, content: &str) {
        let path = repo.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_init_creates_main_branch() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        assert_eq!(repo.current_branch(), Some(DEFAULT_BRANCH));
        assert_eq!(repo.branches().unwrap().len(), 1);
        assert!(Repository::is_initialized(dir.path()));
        assert!(dir.path().join(REPO_DIR).join(CONFIG_FILE).is_file());
    }

    #[test]
    fn test_open_requires_init() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Repository::open(dir.path()),
            Err(Error::NotInitialized(_))
        ));
    }

    #[test]
    fn test_reopen_preserves_state() {
        let dir = TempDir::new().unwrap();
        let id = {
            let mut repo = Repository::init(dir.path()).unwrap();
            write(&repo, "a.txt", "a");
            repo.create_branch("feat", "").unwrap();
            repo.switch_branch("feat").unwrap();
            repo.commit("on feat", "user").unwrap().unwrap()
        };

        let repo = Repository::open(dir.path()).unwrap();
        assert_eq!(repo.current_branch(), Some("feat"));
        assert_eq!(repo.branch_head("feat").unwrap(), Some(id));

        let again = Repository::init(dir.path()).unwrap();
        assert_eq!(again.branches().unwrap().len(), 2);
    }

    #[test]
    fn test_commit_records_parent_chain() {
        let dir = TempDir::new().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();

        write(&repo, "a.txt", "1");
        let first = repo.commit("first", "user").unwrap().unwrap();
        write(&repo, "a.txt", "2");
        let second = repo.commit("second", "alice").unwrap().unwrap();

        let commit = repo.get_commit(&second).unwrap().unwrap();
        assert_eq!(commit.parent_id, Some(first.clone()));
        assert_eq!(commit.author, "alice");
        assert_eq!(commit.branch, "main");
        assert!(repo.get_commit(&first).unwrap().unwrap().parent_id.is_none());
    }

    #[test]
    fn test_commit_snapshot_matches_tree() {
        let dir = TempDir::new().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        write(&repo, "a.txt", "alpha");
        write(&repo, "src/lib.rs", "pub fn f() {}");
        write(&repo, "target/ignored.o", "binary");

        let id = repo.commit("snap", "user").unwrap().unwrap();
        let snapshot = repo.get_commit_snapshot(&id).unwrap().unwrap();

        assert_eq!(snapshot.paths().collect::<Vec<_>>(), vec!["a.txt", "src/lib.rs"]);
        assert_eq!(
            snapshot.get("a.txt").unwrap().hash,
            crate::digest::digest_hex(b"alpha")
        );
    }

    #[test]
    fn test_corrupt_snapshot_is_absent() {
        let dir = TempDir::new().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        write(&repo, "a.txt", "a");
        let id = repo.commit("c", "user").unwrap().unwrap();
        let digest = repo.get_commit(&id).unwrap().unwrap().snapshot;

        let path = repo.objects().root().join(&digest[..2]).join(&digest[2..]);
        fs::write(path, b"not json").unwrap();

        assert!(repo.get_commit_snapshot(&id).unwrap().is_none());
        assert!(repo.get_commit_snapshot("ffffffffffffffff").unwrap().is_none());
    }

    #[test]
    fn test_create_branch_forks_at_head() {
        let dir = TempDir::new().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        assert!(repo.create_branch("empty", "no commits yet").unwrap());
        assert!(repo.branch_head("empty").unwrap().is_none());

        write(&repo, "a.txt", "a");
        let head = repo.commit("c", "user").unwrap().unwrap();
        assert!(repo.create_branch("feat", "").unwrap());
        assert_eq!(repo.branch_head("feat").unwrap(), Some(head));
        assert!(!repo.create_branch("feat", "").unwrap());
        assert_eq!(repo.history(None, 200).unwrap().len(), 1);
    }

    #[test]
    fn test_switch_to_unknown_or_empty_branch() {
        let dir = TempDir::new().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        assert!(repo.switch_branch("nope").unwrap().is_none());

        repo.create_branch("empty", "").unwrap();
        write(&repo, "keep.txt", "untouched");
        let report = repo.switch_branch("empty").unwrap().unwrap();

        assert_eq!(report, RestoreReport::default());
        assert_eq!(repo.current_branch(), Some("empty"));
        assert_eq!(
            fs::read_to_string(repo.root().join("keep.txt")).unwrap(),
            "untouched"
        );
    }

    #[test]
    fn test_delete_branch() {
        let dir = TempDir::new().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        write(&repo, "a.txt", "a");
        repo.create_branch("feat", "").unwrap();
        repo.switch_branch("feat").unwrap();
        let id = repo.commit("on feat", "user").unwrap().unwrap();

        assert!(!repo.delete_branch("feat").unwrap());
        repo.switch_branch("main").unwrap();
        assert!(repo.delete_branch("feat").unwrap());
        assert!(!repo.delete_branch("feat").unwrap());

        // Orphaned commits remain reachable through history.
        assert!(repo.history(None, 200).unwrap().iter().any(|c| c.id == id));
    }

    #[test]
    fn test_merge_refusals() {
        let dir = TempDir::new().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        repo.create_branch("empty", "").unwrap();

        assert_eq!(
            repo.merge_branch("main", None).unwrap(),
            MergeOutcome::Refused(MergeRefusal::SameBranch)
        );
        assert_eq!(
            repo.merge_branch("ghost", None).unwrap(),
            MergeOutcome::Refused(MergeRefusal::UnknownBranch)
        );
        assert_eq!(
            repo.merge_branch("empty", None).unwrap(),
            MergeOutcome::Refused(MergeRefusal::SourceHasNoCommits)
        );
    }

    #[test]
    fn test_merge_default_message() {
        let dir = TempDir::new().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        write(&repo, "a.txt", "a");
        repo.commit("base", "user").unwrap();
        repo.create_branch("feat", "").unwrap();
        repo.switch_branch("feat").unwrap();
        write(&repo, "b.txt", "b");
        repo.commit("add b", "user").unwrap();
        repo.switch_branch("main").unwrap();
        assert!(!repo.root().join("b.txt").exists());

        let report = match repo.merge_branch("feat", None).unwrap() {
            MergeOutcome::Merged(report) => report,
            MergeOutcome::Refused(reason) => panic!("merge refused: {}", reason),
        };
        assert!(report.conflicts.is_empty());
        assert_eq!(report.files_merged, 2);

        let commit = repo
            .get_commit(report.commit_id.as_deref().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(commit.message, "merge 'feat' into 'main'");
        assert_eq!(commit.branch, "main");
        assert!(repo.root().join("b.txt").exists());
    }

    #[test]
    fn test_diff_file_content() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let a = repo.objects().store(b"one\ntwo\n").unwrap();
        let b = repo.objects().store(b"one\nthree\n").unwrap();

        let lines = repo.diff_file_content(&a, &b).unwrap();
        assert!(lines.contains(&"-two".to_string()));
        assert!(lines.contains(&"+three".to_string()));

        assert!(repo.diff_file_content(&a, "ffffffffffffffff").unwrap().is_empty());
    }

    #[test]
    fn test_tags() {
        let dir = TempDir::new().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        assert!(!repo.create_tag("v0", None, "").unwrap());

        write(&repo, "a.txt", "a");
        let id = repo.commit("c", "user").unwrap().unwrap();
        assert!(repo.create_tag("v1", None, "first").unwrap());
        assert!(!repo.create_tag("v1", Some(&id), "").unwrap());
        assert!(!repo.create_tag("v2", Some("ffffffffffffffff"), "").unwrap());

        let tag = repo.get_tag("v1").unwrap().unwrap();
        assert_eq!(tag.commit_id, id);
        assert_eq!(repo.tags().unwrap().len(), 1);
        assert!(repo.goto_tag("missing").unwrap().is_none());
    }

    #[test]
    fn test_annotations() {
        let dir = TempDir::new().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();

        let id = repo.add_annotation("c1", "a.rs", "check this", Some(12)).unwrap();
        repo.add_annotation("c1", "b.rs", "and this", None).unwrap();

        let on_a = repo.annotations(Some("c1"), Some("a.rs")).unwrap();
        assert_eq!(on_a.len(), 1);
        assert_eq!(on_a[0].id, id);
        assert_eq!(on_a[0].line_number, Some(12));
        assert_eq!(repo.annotations(None, None).unwrap().len(), 2);
    }

    #[test]
    fn test_diff_identical_binary_object_is_empty() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let digest = repo.objects().store(b"\x00\x01\x02").unwrap();

        assert!(repo.diff_file_content(&digest, &digest).unwrap().is_empty());
    }

    #[test]
    fn test_stats() {
        let dir = TempDir::new().unwrap();
        let mut repo = Repository::init(dir.path()).unwrap();
        write(&repo, "a.txt", "hello");
        let id = repo.commit("c", "user").unwrap().unwrap();
        repo.create_tag("v1", None, "").unwrap();
        repo.add_annotation(&id, "a.txt", "greeting", None).unwrap();

        let stats = repo.stats().unwrap();
        assert_eq!(stats.commits, 1);
        assert_eq!(stats.branches, 1);
        assert_eq!(stats.tags, 1);
        assert_eq!(stats.annotations, 1);
        // File content plus the snapshot object.
        assert_eq!(stats.objects, 2);
        assert!(stats.storage_bytes > 5);
    }

    #[test]
    fn test_working_changes_without_commits() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        write(&repo, "a.txt", "a");

        let changes = repo.working_changes().unwrap().into_value();
        assert_eq!(changes.added.keys().collect::<Vec<_>>(), vec!["a.txt"]);
    }
}
