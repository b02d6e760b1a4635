//! Content-addressed object store.
//!
//! Blobs live under `objects/<first 2 hex chars>/<remaining hex chars>` and
//! are written at most once: the digest is a pure function of the content, so
//! an existing path is never rewritten. File contents and serialized
//! snapshots share the same namespace. There is no deletion; the store only
//! grows.

use crate::digest::{self, digest_hex};
use crate::error::Result;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Name prefix of in-flight writes; never counted as objects.
const TMP_PREFIX: &str = ".tmp-";

#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

/// Object count and byte total of the store, as found on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskUsage {
    pub objects: usize,
    pub bytes: u64,
}

impl ObjectStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stores `content` and returns its digest.
    ///
    /// Idempotent: storing the same bytes twice yields the same digest and
    /// leaves a single file on disk.
    pub fn store(&self, content: &[u8]) -> Result<String> {
        let digest = digest_hex(content);
        let path = self.object_path(&digest);

        if path.exists() {
            trace!("Object {} already stored", digest);
            return Ok(digest);
        }

        let Some(parent) = path.parent() else {
            return Err(std::io::Error::from(ErrorKind::InvalidInput).into());
        };
        fs::create_dir_all(parent)?;

        // Each writer gets its own temp file; a torn write never sits at the
        // final path, where the existence check would keep it forever.
        let mut tmp = tempfile::Builder::new()
            .prefix(TMP_PREFIX)
            .tempfile_in(parent)?;
        tmp.write_all(content)?;
        if let Err(e) = tmp.persist(&path) {
            // Another writer got there first with identical bytes.
            if !path.is_file() {
                return Err(e.error.into());
            }
            trace!("Object {} stored concurrently", digest);
            return Ok(digest);
        }

        debug!("Stored object {} ({} bytes)", digest, content.len());
        Ok(digest)
    }

    /// Reads the object with the given digest.
    ///
    /// Returns `Ok(None)` when the object does not exist or the digest is
    /// malformed; only genuine I/O failures are errors.
    pub fn read(&self, digest: &str) -> Result<Option<Vec<u8>>> {
        if digest::validate(digest).is_err() {
            debug!("Refusing to read malformed digest {:?}", digest);
            return Ok(None);
        }

        match fs::read(self.object_path(digest)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn contains(&self, digest: &str) -> bool {
        digest::validate(digest).is_ok() && self.object_path(digest).is_file()
    }

    /// Walks the whole object tree summing file sizes. O(object count).
    pub fn disk_usage(&self) -> Result<DiskUsage> {
        let mut usage = DiskUsage::default();

        if !self.root.is_dir() {
            return Ok(usage);
        }

        for entry in WalkDir::new(&self.root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file()
                || entry.file_name().to_string_lossy().starts_with(TMP_PREFIX)
            {
                continue;
            }
            if let Ok(metadata) = entry.metadata() {
                usage.objects += 1;
                usage.bytes += metadata.len();
            }
        }

        Ok(usage)
    }

    fn object_path(&self, digest: &str) -> PathBuf {
        let (shard, rest) = digest.split_at(2);
        self.root.join(shard).join(rest)
    }
}
