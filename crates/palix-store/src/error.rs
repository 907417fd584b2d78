use crate::path::StorePath;

/// Errors from tree store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested node (or a parent of it) does not exist.
    #[error("not found: {0}")]
    NotFound(StorePath),

    /// A path component exists as a leaf where a directory is required.
    #[error("not a directory: {0}")]
    NotADirectory(StorePath),

    /// A leaf operation targeted a directory.
    #[error("is a directory: {0}")]
    IsADirectory(StorePath),

    /// A host node is neither a regular file nor a directory (a symlink,
    /// socket and so on). The store never reads or writes through one.
    #[error("not a regular file or directory: {0}")]
    NotRegular(StorePath),

    /// A path string could not be turned into store segments.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: StorePath,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: &StorePath, source: std::io::Error) -> Self {
        Self::Io {
            path: path.clone(),
            source,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
