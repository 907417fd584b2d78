use crate::error::{StoreError, StoreResult};
use crate::path::StorePath;

/// The kind of a node in a tree store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    /// A directory: has children, no payload.
    Directory,
    /// A leaf holding bytes.
    File,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directory => write!(f, "directory"),
            Self::File => write!(f, "file"),
        }
    }
}

/// One child returned by [`TreeStore::list_dir`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirEntry {
    pub name: String,
    pub kind: NodeKind,
}

/// A tree of directories and named byte blobs.
///
/// All implementations must satisfy these invariants:
/// - No two leaves share a full path.
/// - Creating a directory that already exists is a no-op, never an error.
/// - A path component that is a leaf can never be treated as a directory.
/// - `list_dir` returns children sorted by name (byte-wise).
/// - Only the "already exists as a directory" condition is swallowed; every
///   other I/O error is propagated.
pub trait TreeStore: Send + Sync {
    /// Kind of the node at `path`, or `None` if nothing is there.
    fn node_kind(&self, path: &StorePath) -> StoreResult<Option<NodeKind>>;

    /// Create one directory. The parent must exist.
    ///
    /// Returns `true` if the directory was created, `false` if it already
    /// existed.
    fn create_dir(&self, path: &StorePath) -> StoreResult<bool>;

    /// Create or replace a leaf. The parent directory must exist.
    fn write_file(&self, path: &StorePath, data: &[u8]) -> StoreResult<()>;

    /// Read a leaf. Returns `Ok(None)` if nothing exists at `path`.
    fn read_file(&self, path: &StorePath) -> StoreResult<Option<Vec<u8>>>;

    /// List the children of a directory, sorted by name.
    fn list_dir(&self, path: &StorePath) -> StoreResult<Vec<DirEntry>>;

    /// Create `path` and every missing ancestor.
    fn create_dir_all(&self, path: &StorePath) -> StoreResult<()> {
        for prefix in path.prefixes() {
            self.create_dir(&prefix)?;
        }
        Ok(())
    }

    /// Check whether any node exists at `path`.
    fn exists(&self, path: &StorePath) -> StoreResult<bool> {
        Ok(self.node_kind(path)?.is_some())
    }

    /// Create the parent directories of `path`, then write the leaf.
    fn write_file_all(&self, path: &StorePath, data: &[u8]) -> StoreResult<()> {
        let parent = path
            .parent()
            .ok_or_else(|| StoreError::IsADirectory(path.clone()))?;
        self.create_dir_all(&parent)?;
        self.write_file(path, data)
    }
}
