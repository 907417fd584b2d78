use std::collections::HashMap;

use crate::indexed::IndexedImage;
use crate::pixel::{PixelBuffer, Rgb};

/// Encode a pixel buffer into its palette-indexed form.
///
/// Colors are numbered in first-occurrence order scanning row-major, so the
/// same buffer always encodes to the same image. Alpha is discarded: pixels
/// that differ only in alpha share one palette entry.
pub fn encode(buffer: &PixelBuffer) -> IndexedImage {
    let width = buffer.width() as usize;
    let height = buffer.height() as usize;

    let mut lookup: HashMap<Rgb, u32> = HashMap::new();
    let mut palette: Vec<Rgb> = Vec::new();
    let mut pixels: Vec<Vec<u32>> = Vec::with_capacity(height);

    let mut samples = buffer.samples().iter();
    for _ in 0..height {
        let mut row = Vec::with_capacity(width);
        for sample in samples.by_ref().take(width) {
            let color = sample.rgb();
            let index = *lookup.entry(color).or_insert_with(|| {
                palette.push(color);
                (palette.len() - 1) as u32
            });
            row.push(index);
        }
        pixels.push(row);
    }

    tracing::trace!(
        width = buffer.width(),
        height = buffer.height(),
        colors = palette.len(),
        "encoded pixel buffer"
    );

    IndexedImage {
        width: buffer.width(),
        height: buffer.height(),
        pixels,
        palette,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Rgba;

    fn buffer(width: u32, height: u32, samples: &[[u8; 4]]) -> PixelBuffer {
        PixelBuffer::new(width, height, samples.iter().map(|&s| Rgba::from(s)).collect()).unwrap()
    }

    #[test]
    fn alpha_difference_collapses() {
        let img = encode(&buffer(2, 1, &[[10, 20, 30, 255], [10, 20, 30, 128]]));
        assert_eq!(img.palette, vec![Rgb::new(10, 20, 30)]);
        assert_eq!(img.pixels, vec![vec![0, 0]]);
    }

    #[test]
    fn palette_in_first_occurrence_order() {
        let img = encode(&buffer(
            2,
            2,
            &[[9, 9, 9, 255], [1, 1, 1, 255], [1, 1, 1, 255], [5, 5, 5, 255]],
        ));
        assert_eq!(
            img.palette,
            vec![Rgb::new(9, 9, 9), Rgb::new(1, 1, 1), Rgb::new(5, 5, 5)]
        );
        assert_eq!(img.pixels, vec![vec![0, 1], vec![1, 2]]);
    }

    #[test]
    fn rows_break_at_width() {
        let img = encode(&buffer(1, 3, &[[0, 0, 0, 0], [1, 0, 0, 0], [0, 0, 0, 0]]));
        assert_eq!(img.pixels, vec![vec![0], vec![1], vec![0]]);
        assert!(img.validate().is_ok());
    }

    #[test]
    fn zero_width_keeps_one_empty_row_per_line() {
        let img = encode(&buffer(0, 3, &[]));
        assert_eq!(img.pixels, vec![Vec::<u32>::new(); 3]);
        assert!(img.palette.is_empty());
        assert!(img.validate().is_ok());
    }

    #[test]
    fn zero_height_has_no_rows() {
        let img = encode(&buffer(4, 0, &[]));
        assert!(img.pixels.is_empty());
        assert!(img.palette.is_empty());
        assert_eq!(img.width, 4);
    }
}
