use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::path::StorePath;
use crate::traits::{DirEntry, NodeKind, TreeStore};

/// Tree store backed by a directory on the host filesystem.
///
/// Store paths resolve below `base`; since [`StorePath`] segments can never
/// be `..`, nothing outside `base` is reachable.
#[derive(Clone, Debug)]
pub struct FsTreeStore {
    base: PathBuf,
}

impl FsTreeStore {
    /// Open a store rooted at an existing directory.
    pub fn open(base: impl Into<PathBuf>) -> StoreResult<Self> {
        let base = base.into();
        match std::fs::metadata(&base) {
            Ok(meta) if meta.is_dir() => Ok(Self { base }),
            Ok(_) => Err(StoreError::NotADirectory(StorePath::root())),
            Err(e) => Err(StoreError::io(&StorePath::root(), e)),
        }
    }

    /// Create the base directory if needed, then open it.
    pub fn create(base: impl Into<PathBuf>) -> StoreResult<Self> {
        let base = base.into();
        std::fs::create_dir_all(&base).map_err(|e| StoreError::io(&StorePath::root(), e))?;
        Self::open(base)
    }

    /// The host directory backing the store root.
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn host_path(&self, path: &StorePath) -> PathBuf {
        let mut host = self.base.clone();
        host.extend(path.segments());
        host
    }

    fn kind_at(&self, path: &StorePath) -> StoreResult<Option<NodeKind>> {
        // The base itself may be reached through a link; nodes below it may not.
        let host = self.host_path(path);
        let meta = if path.is_root() {
            std::fs::metadata(host)
        } else {
            std::fs::symlink_metadata(host)
        };
        match meta {
            Ok(meta) if meta.is_dir() => Ok(Some(NodeKind::Directory)),
            Ok(meta) if meta.is_file() => Ok(Some(NodeKind::File)),
            Ok(_) => Err(StoreError::NotRegular(path.clone())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Check that every component of `dir` exists and is a directory.
    fn require_dir(&self, dir: &StorePath) -> StoreResult<()> {
        for prefix in dir.prefixes() {
            match self.kind_at(&prefix)? {
                Some(NodeKind::Directory) => {}
                Some(NodeKind::File) => return Err(StoreError::NotADirectory(prefix)),
                None => return Err(StoreError::NotFound(prefix)),
            }
        }
        Ok(())
    }

    /// Like [`Self::kind_at`], but a leaf ancestor means "absent".
    fn resolve(&self, path: &StorePath) -> StoreResult<Option<NodeKind>> {
        if let Some(parent) = path.parent() {
            match self.require_dir(&parent) {
                Ok(()) => {}
                Err(StoreError::NotFound(_) | StoreError::NotADirectory(_)) => return Ok(None),
                Err(e) => return Err(e),
            }
        }
        self.kind_at(path)
    }
}

impl TreeStore for FsTreeStore {
    fn node_kind(&self, path: &StorePath) -> StoreResult<Option<NodeKind>> {
        self.resolve(path)
    }

    fn create_dir(&self, path: &StorePath) -> StoreResult<bool> {
        let Some(parent) = path.parent() else {
            return Ok(false);
        };
        self.require_dir(&parent)?;
        match std::fs::create_dir(self.host_path(path)) {
            Ok(()) => {
                tracing::trace!(%path, "created directory");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => match self.kind_at(path)? {
                Some(NodeKind::Directory) => Ok(false),
                _ => Err(StoreError::NotADirectory(path.clone())),
            },
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn write_file(&self, path: &StorePath, data: &[u8]) -> StoreResult<()> {
        let Some(parent) = path.parent() else {
            return Err(StoreError::IsADirectory(path.clone()));
        };
        self.require_dir(&parent)?;
        if self.kind_at(path)? == Some(NodeKind::Directory) {
            return Err(StoreError::IsADirectory(path.clone()));
        }
        std::fs::write(self.host_path(path), data).map_err(|e| StoreError::io(path, e))
    }

    fn read_file(&self, path: &StorePath) -> StoreResult<Option<Vec<u8>>> {
        match self.resolve(path)? {
            None => Ok(None),
            Some(NodeKind::Directory) => Err(StoreError::IsADirectory(path.clone())),
            Some(NodeKind::File) => std::fs::read(self.host_path(path))
                .map(Some)
                .map_err(|e| StoreError::io(path, e)),
        }
    }

    fn list_dir(&self, path: &StorePath) -> StoreResult<Vec<DirEntry>> {
        self.require_dir(path)?;
        let mut entries = Vec::new();
        let read_dir = std::fs::read_dir(self.host_path(path)).map_err(|e| StoreError::io(path, e))?;
        for entry in read_dir {
            let entry = entry.map_err(|e| StoreError::io(path, e))?;
            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!(dir = %path, "skipping entry with non UTF-8 name");
                continue;
            };
            let file_type = entry.file_type().map_err(|e| StoreError::io(path, e))?;
            let kind = if file_type.is_dir() {
                NodeKind::Directory
            } else if file_type.is_file() {
                NodeKind::File
            } else {
                // Symlinks and special files are not part of the tree.
                tracing::debug!(dir = %path, name = %name, "skipping non-regular entry");
                continue;
            };
            entries.push(DirEntry { name, kind });
        }
        entries.sort();
        Ok(entries)
    }
}
