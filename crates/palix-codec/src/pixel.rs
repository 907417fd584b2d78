use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};

/// An opaque color triple, as stored in a palette.
///
/// Serializes as a `[r, g, b]` array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Attach an alpha channel.
    pub const fn with_alpha(self, a: u8) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A single RGBA sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Drop the alpha channel.
    pub const fn rgb(self) -> Rgb {
        Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

impl From<[u8; 4]> for Rgba {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// A raw raster: row-major RGBA samples with known dimensions.
///
/// `samples.len() == width * height` always holds for buffers built through
/// [`PixelBuffer::new`] or [`PixelBuffer::from_rgba_bytes`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    samples: Vec<Rgba>,
}

impl PixelBuffer {
    /// Create a buffer, checking the sample count against the dimensions.
    pub fn new(width: u32, height: u32, samples: Vec<Rgba>) -> CodecResult<Self> {
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(CodecError::InvalidDimensions {
                width,
                height,
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Create a buffer from interleaved `r, g, b, a` bytes.
    pub fn from_rgba_bytes(width: u32, height: u32, bytes: &[u8]) -> CodecResult<Self> {
        if bytes.len() % 4 != 0 {
            return Err(CodecError::InvalidDimensions {
                width,
                height,
                expected: width as usize * height as usize * 4,
                actual: bytes.len(),
            });
        }
        let samples = bytes
            .chunks_exact(4)
            .map(|c| Rgba::new(c[0], c[1], c[2], c[3]))
            .collect();
        Self::new(width, height, samples)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples(&self) -> &[Rgba] {
        &self.samples
    }

    /// Sample at `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Interleaved `r, g, b, a` bytes, row-major.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.samples
            .iter()
            .flat_map(|s| [s.r, s.g, s.b, s.a])
            .collect()
    }
}
