use thiserror::Error;

/// Errors produced by codec operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// A palette index does not reference an existing palette entry.
    #[error("palette index {index} at ({x}, {y}) out of range for palette of {palette_len} colors")]
    IndexOutOfRange {
        x: u32,
        y: u32,
        index: u32,
        palette_len: usize,
    },

    /// Sample count disagrees with the declared dimensions.
    #[error("invalid dimensions {width}x{height}: expected {expected} samples, got {actual}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// The index grid or palette violates an indexed-image invariant.
    #[error("malformed indexed image: {0}")]
    MalformedImage(String),

    /// JASC palette text could not be parsed.
    #[error("invalid JASC palette: {0}")]
    InvalidPalette(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
