use palix_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive entry path escapes the target root: {0:?}")]
    PathTraversal(String),

    #[error("directory creation conflict at {0}: a file and a directory claim the same path")]
    DirectoryCreationConflict(String),

    #[error("invalid archive magic: expected {expected}, got {actual}")]
    InvalidMagic { expected: String, actual: String },

    #[error("unsupported archive version: {0}")]
    UnsupportedVersion(u32),

    #[error("archive checksum mismatch")]
    ChecksumMismatch,

    #[error("CRC32 mismatch for entry {path:?}")]
    CrcMismatch { path: String },

    #[error("corrupt archive entry at offset {offset}: {reason}")]
    CorruptEntry { offset: u64, reason: String },

    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("compression failed: {0}")]
    CompressionFailed(String),

    #[error("tar container error: {0}")]
    Tar(String),

    #[error("unknown container format for {0:?}")]
    UnknownFormat(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
