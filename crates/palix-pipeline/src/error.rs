use palix_archive::ArchiveError;
use palix_codec::CodecError;
use palix_store::StoreError;

/// Errors a transformation stage reports back to the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// The stage cannot work with the input it was handed.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An index grid could not be written as an `.npy` array.
    #[error("npy encoding failed: {0}")]
    Npy(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Anything else a custom stage wants to report.
    #[error("{0}")]
    Other(String),
}

/// Errors that can occur while running the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input is empty or holds nothing to process.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A recognized image could not be decoded into pixels.
    #[error("failed to decode image {name:?}: {reason}")]
    DecodeFailure { name: String, reason: String },

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The transformation stage failed or produced no output.
    #[error("stage '{stage}' failed: {reason}")]
    StageFailure { stage: String, reason: String },

    /// Configuration is invalid or could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// A preview could not be encoded for display.
    #[error("preview rendering failed: {0}")]
    Render(String),

    /// A manifest key is not a single path segment and cannot name a file.
    #[error("invalid preview name {name:?}: {reason}")]
    InvalidPreviewName { name: String, reason: String },

    /// The preview manifest could not be parsed.
    #[error("preview manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Create a stage failure with a name and reason.
    pub fn stage(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StageFailure {
            stage: stage.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
