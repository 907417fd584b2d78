use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};
use crate::pixel::Rgb;

/// A raster stored as a grid of palette indices plus the palette itself.
///
/// Produced by [`crate::encode`] and never mutated afterwards. Images built
/// elsewhere (deserialized from a preview manifest, for example) should be
/// checked with [`IndexedImage::validate`] before use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedImage {
    pub width: u32,
    pub height: u32,
    /// One row per scanline, each `width` indices long.
    pub pixels: Vec<Vec<u32>>,
    /// Distinct colors, in first-occurrence order.
    pub palette: Vec<Rgb>,
}

impl IndexedImage {
    /// Number of palette entries.
    pub fn color_count(&self) -> usize {
        self.palette.len()
    }

    /// Sorted distinct indices referenced by the grid.
    pub fn used_indices(&self) -> Vec<u32> {
        let set: BTreeSet<u32> = self.pixels.iter().flatten().copied().collect();
        set.into_iter().collect()
    }

    /// Index at `(x, y)`, or `None` outside the grid.
    pub fn index_at(&self, x: u32, y: u32) -> Option<u32> {
        self.pixels
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    /// Check the shape, bounds and uniqueness invariants.
    pub fn validate(&self) -> CodecResult<()> {
        self.check_shape()?;

        let palette_len = self.palette.len();
        for (y, row) in self.pixels.iter().enumerate() {
            for (x, &index) in row.iter().enumerate() {
                if index as usize >= palette_len {
                    return Err(CodecError::IndexOutOfRange {
                        x: x as u32,
                        y: y as u32,
                        index,
                        palette_len,
                    });
                }
            }
        }

        let mut seen = HashSet::with_capacity(palette_len);
        for color in &self.palette {
            if !seen.insert(*color) {
                return Err(CodecError::MalformedImage(format!(
                    "duplicate palette entry {color}"
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn check_shape(&self) -> CodecResult<()> {
        if self.pixels.len() != self.height as usize {
            return Err(CodecError::MalformedImage(format!(
                "expected {} rows, got {}",
                self.height,
                self.pixels.len()
            )));
        }
        if let Some((y, row)) = self
            .pixels
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.width as usize)
        {
            return Err(CodecError::MalformedImage(format!(
                "row {y} has {} indices, expected {}",
                row.len(),
                self.width
            )));
        }
        Ok(())
    }
}
