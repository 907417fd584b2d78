use crate::error::{CodecError, CodecResult};
use crate::indexed::IndexedImage;
use crate::pixel::PixelBuffer;

/// Reconstruct a fully opaque pixel buffer from an indexed image.
///
/// Every output sample has alpha 255; alpha is not part of the indexed form.
/// An index outside the palette is an error, never clamped.
pub fn decode(img: &IndexedImage) -> CodecResult<PixelBuffer> {
    img.check_shape()?;

    let palette_len = img.palette.len();
    let mut samples = Vec::with_capacity(img.width as usize * img.height as usize);
    for (y, row) in img.pixels.iter().enumerate() {
        for (x, &index) in row.iter().enumerate() {
            let color = img
                .palette
                .get(index as usize)
                .ok_or(CodecError::IndexOutOfRange {
                    x: x as u32,
                    y: y as u32,
                    index,
                    palette_len,
                })?;
            samples.push(color.with_alpha(u8::MAX));
        }
    }

    PixelBuffer::new(img.width, img.height, samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{Rgb, Rgba};

    #[test]
    fn decodes_opaque() {
        let img = IndexedImage {
            width: 2,
            height: 1,
            pixels: vec![vec![0, 0]],
            palette: vec![Rgb::new(10, 20, 30)],
        };
        let buf = decode(&img).unwrap();
        assert_eq!(
            buf.samples(),
            &[Rgba::new(10, 20, 30, 255), Rgba::new(10, 20, 30, 255)]
        );
        assert_eq!((buf.width(), buf.height()), (2, 1));
    }

    #[test]
    fn index_out_of_range_fails() {
        let img = IndexedImage {
            width: 2,
            height: 1,
            pixels: vec![vec![0, 1]],
            palette: vec![Rgb::new(0, 0, 0)],
        };
        assert_eq!(
            decode(&img).unwrap_err(),
            CodecError::IndexOutOfRange {
                x: 1,
                y: 0,
                index: 1,
                palette_len: 1
            }
        );
    }

    #[test]
    fn empty_palette_with_pixels_fails() {
        let img = IndexedImage {
            width: 1,
            height: 1,
            pixels: vec![vec![0]],
            palette: vec![],
        };
        assert!(matches!(
            decode(&img),
            Err(CodecError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn row_count_mismatch_fails() {
        let img = IndexedImage {
            width: 1,
            height: 2,
            pixels: vec![vec![0]],
            palette: vec![Rgb::new(0, 0, 0)],
        };
        assert!(matches!(decode(&img), Err(CodecError::MalformedImage(_))));
    }
}
