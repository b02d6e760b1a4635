//! # quelldex-core
//!
//! Core library for quelldex - a lightweight, embedded version-control engine.
//!
//! This crate provides the content-addressed object store, snapshotting of a
//! project tree, and the branch/commit/tag/annotation metadata layer, along
//! with diff and last-writer-wins merge. Everything is local and
//! single-writer; [`Repository`] is the entry point.

pub mod config;
pub mod diff;
pub mod digest;
pub mod error;
pub mod merge;
pub mod models;
pub mod objects;
pub mod repository;
pub mod snapshot;
pub mod storage;

pub use config::{IgnoreRules, RepoConfig};
pub use diff::SnapshotDiff;
pub use error::{Error, Result};
pub use merge::{MergeOutcome, MergeRefusal, MergeReport};
pub use models::{Annotation, Branch, Commit, RepoStats, Snapshot, SnapshotEntry, Tag};
pub use objects::ObjectStore;
pub use repository::Repository;
pub use snapshot::{ChangeDetection, RestoreReport, Scanned, Scanner, Warning, WorkingChanges};
pub use storage::Storage;
