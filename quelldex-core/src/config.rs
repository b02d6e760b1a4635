//! Repository configuration and ignore rules.
//!
//! Configuration lives in `.quelldex/config.toml`. Every field is optional;
//! a missing file means all defaults.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Name of the metadata directory at the repository root.
pub const REPO_DIR: &str = ".quelldex";

pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// Directory names skipped by default: version-control internals, dependency
/// caches, build output and editor metadata.
pub const DEFAULT_IGNORE_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    REPO_DIR,
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "env",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    ".next",
    ".nuxt",
    "dist",
    "build",
    ".cache",
    ".idea",
    ".vscode",
    ".vs",
    "vendor",
    "bower_components",
    "target",
    ".gradle",
    "Pods",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Directory names never descended into while scanning.
    pub ignore_dirs: Vec<String>,
    /// Re-hash files during change detection instead of trusting mtime+size.
    pub verify_hashes: bool,
    pub history_limit: usize,
    pub default_author: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|s| s.to_string()).collect(),
            verify_hashes: false,
            history_limit: DEFAULT_HISTORY_LIMIT,
            default_author: "user".to_string(),
        }
    }
}

impl RepoConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn ignore_rules(&self) -> IgnoreRules {
        IgnoreRules::from_names(self.ignore_dirs.iter().cloned())
    }
}

type DirPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Decides which directories the scanner skips.
///
/// A directory is skipped when its name is in the set or the optional
/// predicate returns `true`. The metadata directory is always skipped.
#[derive(Clone)]
pub struct IgnoreRules {
    names: BTreeSet<String>,
    predicate: Option<DirPredicate>,
}

impl IgnoreRules {
    /// Rules that skip nothing but the metadata directory.
    pub fn none() -> Self {
        Self {
            names: BTreeSet::new(),
            predicate: None,
        }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            predicate: None,
        }
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn is_ignored(&self, dir_name: &str) -> bool {
        dir_name == REPO_DIR
            || self.names.contains(dir_name)
            || self.predicate.as_ref().is_some_and(|p| p(dir_name))
    }
}

impl Default for IgnoreRules {
    fn default() -> Self {
        Self::from_names(DEFAULT_IGNORE_DIRS.iter().copied())
    }
}

impl fmt::Debug for IgnoreRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreRules")
            .field("names", &self.names)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}
