//! JASC-PAL palette text format (Paint Shop Pro palettes).
//!
//! ```text
//! JASC-PAL
//! 0100
//! 2
//! 255 0 0
//! 0 0 255
//! ```

use crate::error::{CodecError, CodecResult};
use crate::pixel::Rgb;

const HEADER: &str = "JASC-PAL";
const VERSION: &str = "0100";

/// Render a palette as JASC-PAL text. Lines are `\n`-separated with no
/// trailing newline.
pub fn to_jasc_pal(palette: &[Rgb]) -> String {
    let mut lines = Vec::with_capacity(palette.len() + 3);
    lines.push(HEADER.to_string());
    lines.push(VERSION.to_string());
    lines.push(palette.len().to_string());
    for c in palette {
        lines.push(format!("{} {} {}", c.r, c.g, c.b));
    }
    lines.join("\n")
}

/// Parse JASC-PAL text back into a palette.
pub fn parse_jasc_pal(text: &str) -> CodecResult<Vec<Rgb>> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    if lines.next() != Some(HEADER) {
        return Err(CodecError::InvalidPalette("missing JASC-PAL header".into()));
    }
    match lines.next() {
        Some(VERSION) => {}
        other => {
            return Err(CodecError::InvalidPalette(format!(
                "unsupported version: {}",
                other.unwrap_or("<none>")
            )))
        }
    }
    let count: usize = lines
        .next()
        .ok_or_else(|| CodecError::InvalidPalette("missing color count".into()))?
        .parse()
        .map_err(|e| CodecError::InvalidPalette(format!("bad color count: {e}")))?;

    let mut palette = Vec::with_capacity(count);
    for line in lines {
        let channels = line
            .split_whitespace()
            .map(str::parse::<u8>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CodecError::InvalidPalette(format!("bad color row {line:?}: {e}")))?;
        match channels.as_slice() {
            [r, g, b] => palette.push(Rgb::new(*r, *g, *b)),
            _ => {
                return Err(CodecError::InvalidPalette(format!(
                    "expected 3 channels in {line:?}"
                )))
            }
        }
    }

    if palette.len() != count {
        return Err(CodecError::InvalidPalette(format!(
            "header declares {count} colors, found {}",
            palette.len()
        )));
    }
    Ok(palette)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_count_and_rows() {
        let text = to_jasc_pal(&[Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)]);
        assert_eq!(text, "JASC-PAL\n0100\n2\n255 0 0\n0 0 255");
    }

    #[test]
    fn empty_palette() {
        assert_eq!(to_jasc_pal(&[]), "JASC-PAL\n0100\n0");
        assert_eq!(parse_jasc_pal("JASC-PAL\n0100\n0").unwrap(), vec![]);
    }

    #[test]
    fn parse_roundtrip() {
        let palette = vec![Rgb::new(1, 2, 3), Rgb::new(4, 5, 6), Rgb::new(7, 8, 9)];
        assert_eq!(parse_jasc_pal(&to_jasc_pal(&palette)).unwrap(), palette);
    }

    #[test]
    fn parse_accepts_crlf() {
        let parsed = parse_jasc_pal("JASC-PAL\r\n0100\r\n1\r\n10 20 30\r\n").unwrap();
        assert_eq!(parsed, vec![Rgb::new(10, 20, 30)]);
    }

    #[test]
    fn parse_rejects_count_mismatch() {
        let err = parse_jasc_pal("JASC-PAL\n0100\n2\n1 2 3").unwrap_err();
        assert!(matches!(err, CodecError::InvalidPalette(_)));
    }

    #[test]
    fn parse_rejects_bad_header_and_rows() {
        assert!(parse_jasc_pal("GIMP Palette\n0100\n0").is_err());
        assert!(parse_jasc_pal("JASC-PAL\n0200\n0").is_err());
        assert!(parse_jasc_pal("JASC-PAL\n0100\n1\n1 2").is_err());
        assert!(parse_jasc_pal("JASC-PAL\n0100\n1\n1 2 300").is_err());
    }
}
