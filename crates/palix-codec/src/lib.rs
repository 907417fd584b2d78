//! Palette-indexed image codec for palix.
//!
//! Converts raw RGBA rasters into a compact index grid plus palette and back.
//!
//! # Key Types
//!
//! - [`PixelBuffer`] -- row-major RGBA samples with dimensions
//! - [`IndexedImage`] -- index grid + first-occurrence palette
//! - [`Rgb`] / [`Rgba`] -- color values
//!
//! # Guarantees
//!
//! 1. [`encode`] is deterministic: identical buffers give identical images.
//! 2. Palettes never contain duplicates and every index is in range.
//! 3. [`decode`] of an encoded buffer reproduces its RGB channels exactly;
//!    alpha always comes back as 255.

pub mod decode;
pub mod encode;
pub mod error;
pub mod indexed;
pub mod jasc;
pub mod pixel;

pub use decode::decode;
pub use encode::encode;
pub use error::{CodecError, CodecResult};
pub use indexed::IndexedImage;
pub use jasc::{parse_jasc_pal, to_jasc_pal};
pub use pixel::{PixelBuffer, Rgb, Rgba};
