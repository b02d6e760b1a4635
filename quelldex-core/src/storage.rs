use crate::error::Result;
use crate::models::{Annotation, Branch, Commit, Tag};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const SCHEMA_VERSION: i32 = 1;

const CURRENT_BRANCH_KEY: &str = "current_branch";

const COMMIT_COLUMNS: &str = "id, branch, parent_id, timestamp, message, author, snapshot";

/// SQLite-backed metadata: commits, branches, the current-branch register,
/// tags and annotations.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let mut storage = Self { conn };
        storage.initialize()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut storage = Self { conn };
        storage.initialize()?;
        Ok(storage)
    }

    fn initialize(&mut self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS commits (
                id TEXT PRIMARY KEY,
                branch TEXT NOT NULL,
                parent_id TEXT,
                timestamp REAL NOT NULL,
                message TEXT NOT NULL,
                author TEXT NOT NULL DEFAULT 'user',
                snapshot TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS branches (
                name TEXT PRIMARY KEY,
                head_commit TEXT,
                created_at REAL NOT NULL,
                description TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS current_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tags (
                name TEXT PRIMARY KEY,
                commit_id TEXT NOT NULL,
                created_at REAL NOT NULL,
                description TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS annotations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                commit_id TEXT NOT NULL,
                file_path TEXT NOT NULL,
                line_number INTEGER,
                content TEXT NOT NULL,
                created_at REAL NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_commits_branch ON commits(branch);
            CREATE INDEX IF NOT EXISTS idx_commits_timestamp ON commits(timestamp);
            CREATE INDEX IF NOT EXISTS idx_annotations_commit ON annotations(commit_id);
            "#,
        )?;

        let version: Option<i32> = self
            .conn
            .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
            .optional()?;

        if version.is_none() {
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )?;
        }

        Ok(())
    }

    // Commit operations

    /// Inserts the commit and moves its branch head to it in one transaction.
    pub fn record_commit(&self, commit: &Commit) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO commits (id, branch, parent_id, timestamp, message, author, snapshot)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                commit.id,
                commit.branch,
                commit.parent_id,
                commit.timestamp,
                commit.message,
                commit.author,
                commit.snapshot,
            ],
        )?;
        tx.execute(
            "UPDATE branches SET head_commit = ?1 WHERE name = ?2",
            params![commit.id, commit.branch],
        )?;

        tx.commit()?;
        Ok(())
    }

    pub fn get_commit(&self, id: &str) -> Result<Option<Commit>> {
        let commit = self
            .conn
            .query_row(
                &format!("SELECT {} FROM commits WHERE id = ?1", COMMIT_COLUMNS),
                params![id],
                Self::commit_from_row,
            )
            .optional()?;

        Ok(commit)
    }

    /// Commits newest first, optionally restricted to those made on `branch`.
    pub fn history(&self, branch: Option<&str>, limit: usize) -> Result<Vec<Commit>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let commits = match branch {
            Some(branch) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM commits WHERE branch = ?1
                     ORDER BY timestamp DESC, rowid DESC LIMIT ?2",
                    COMMIT_COLUMNS
                ))?;
                let rows = stmt.query_map(params![branch, limit], Self::commit_from_row)?;
                rows.collect::<rusqlite::Result<Vec<Commit>>>()?
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM commits ORDER BY timestamp DESC, rowid DESC LIMIT ?1",
                    COMMIT_COLUMNS
                ))?;
                let rows = stmt.query_map(params![limit], Self::commit_from_row)?;
                rows.collect::<rusqlite::Result<Vec<Commit>>>()?
            }
        };

        Ok(commits)
    }

    // Branch operations

    /// Returns `false` when a branch with that name already exists.
    pub fn create_branch(&self, branch: &Branch) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO branches (name, head_commit, created_at, description)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                branch.name,
                branch.head_commit,
                branch.created_at,
                branch.description,
            ],
        )?;

        Ok(inserted == 1)
    }

    pub fn get_branch(&self, name: &str) -> Result<Option<Branch>> {
        let branch = self
            .conn
            .query_row(
                "SELECT name, head_commit, created_at, description FROM branches WHERE name = ?1",
                params![name],
                Self::branch_from_row,
            )
            .optional()?;

        Ok(branch)
    }

    pub fn branches(&self) -> Result<Vec<Branch>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, head_commit, created_at, description FROM branches
             ORDER BY created_at, name",
        )?;

        let branches = stmt
            .query_map([], Self::branch_from_row)?
            .collect::<rusqlite::Result<Vec<Branch>>>()?;

        Ok(branches)
    }

    /// Head commit of `name`, or `None` if the branch is unknown or empty.
    pub fn branch_head(&self, name: &str) -> Result<Option<String>> {
        Ok(self.get_branch(name)?.and_then(|b| b.head_commit))
    }

    pub fn delete_branch(&self, name: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM branches WHERE name = ?1", params![name])?;

        Ok(deleted > 0)
    }

    pub fn current_branch(&self) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM current_state WHERE key = ?1",
                params![CURRENT_BRANCH_KEY],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    pub fn set_current_branch(&self, name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO current_state (key, value) VALUES (?1, ?2)",
            params![CURRENT_BRANCH_KEY, name],
        )?;

        Ok(())
    }

    // Tag operations

    /// Returns `false` when a tag with that name already exists.
    pub fn create_tag(&self, tag: &Tag) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO tags (name, commit_id, created_at, description)
             VALUES (?1, ?2, ?3, ?4)",
            params![tag.name, tag.commit_id, tag.created_at, tag.description],
        )?;

        Ok(inserted == 1)
    }

    pub fn get_tag(&self, name: &str) -> Result<Option<Tag>> {
        let tag = self
            .conn
            .query_row(
                "SELECT name, commit_id, created_at, description FROM tags WHERE name = ?1",
                params![name],
                Self::tag_from_row,
            )
            .optional()?;

        Ok(tag)
    }

    pub fn tags(&self) -> Result<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, commit_id, created_at, description FROM tags
             ORDER BY created_at DESC, name",
        )?;

        let tags = stmt
            .query_map([], Self::tag_from_row)?
            .collect::<rusqlite::Result<Vec<Tag>>>()?;

        Ok(tags)
    }

    // Annotation operations

    pub fn add_annotation(
        &self,
        commit_id: &str,
        file_path: &str,
        line_number: Option<u32>,
        content: &str,
        created_at: f64,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO annotations (commit_id, file_path, line_number, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![commit_id, file_path, line_number, content, created_at],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Annotations newest first. `None` filters match everything.
    pub fn annotations(
        &self,
        commit_id: Option<&str>,
        file_path: Option<&str>,
    ) -> Result<Vec<Annotation>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, commit_id, file_path, line_number, content, created_at FROM annotations
             WHERE (?1 IS NULL OR commit_id = ?1) AND (?2 IS NULL OR file_path = ?2)
             ORDER BY created_at DESC, id DESC",
        )?;

        let annotations = stmt
            .query_map(params![commit_id, file_path], Self::annotation_from_row)?
            .collect::<rusqlite::Result<Vec<Annotation>>>()?;

        Ok(annotations)
    }

    // Counts

    pub fn count(&self, table: Table) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.as_str()),
            [],
            |row| row.get(0),
        )?;

        Ok(usize::try_from(count).unwrap_or_default())
    }

    // Helper methods
    fn commit_from_row(row: &Row) -> rusqlite::Result<Commit> {
        Ok(Commit {
            id: row.get(0)?,
            branch: row.get(1)?,
            parent_id: row.get(2)?,
            timestamp: row.get(3)?,
            message: row.get(4)?,
            author: row.get(5)?,
            snapshot: row.get(6)?,
        })
    }

    fn branch_from_row(row: &Row) -> rusqlite::Result<Branch> {
        Ok(Branch {
            name: row.get(0)?,
            head_commit: row.get(1)?,
            created_at: row.get(2)?,
            description: row.get(3)?,
        })
    }

    fn tag_from_row(row: &Row) -> rusqlite::Result<Tag> {
        Ok(Tag {
            name: row.get(0)?,
            commit_id: row.get(1)?,
            created_at: row.get(2)?,
            description: row.get(3)?,
        })
    }

    fn annotation_from_row(row: &Row) -> rusqlite::Result<Annotation> {
        Ok(Annotation {
            id: row.get(0)?,
            commit_id: row.get(1)?,
            file_path: row.get(2)?,
            line_number: row.get(3)?,
            content: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

/// Tables whose rows can be counted through [`Storage::count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Commits,
    Branches,
    Tags,
    Annotations,
}

impl Table {
    fn as_str(&self) -> &'static str {
        match self {
            Table::Commits => "commits",
            Table::Branches => "branches",
            Table::Tags => "tags",
            Table::Annotations => "annotations",
        }
    }
}
