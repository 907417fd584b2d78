//! Minimal NumPy `.npy` writer for index grids.
//!
//! Format 1.0: magic, version, little-endian u16 header length, then a
//! Python dict literal padded with spaces so the data starts on a 64-byte
//! boundary. Data is C-order `u8`.

use crate::error::StageError;

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const ALIGN: usize = 64;

/// Encode an index grid as a `(rows, width)` `u8` array.
pub fn encode_u8_grid(rows: &[Vec<u32>], width: u32) -> Result<Vec<u8>, StageError> {
    let mut data = Vec::with_capacity(rows.len() * width as usize);
    for (y, row) in rows.iter().enumerate() {
        if row.len() != width as usize {
            return Err(StageError::Npy(format!(
                "row {y} has {} values, expected {width}",
                row.len()
            )));
        }
        for (x, &value) in row.iter().enumerate() {
            let byte = u8::try_from(value).map_err(|_| {
                StageError::Npy(format!("value {value} at ({x}, {y}) does not fit in u8"))
            })?;
            data.push(byte);
        }
    }

    let dict = format!(
        "{{'descr': '|u1', 'fortran_order': False, 'shape': ({}, {}), }}",
        rows.len(),
        width
    );
    // magic + version + header length field
    let preamble = MAGIC.len() + 2 + 2;
    let unpadded = preamble + dict.len() + 1;
    let padding = (ALIGN - unpadded % ALIGN) % ALIGN;
    let header_len = dict.len() + padding + 1;
    let header_len_field = u16::try_from(header_len)
        .map_err(|_| StageError::Npy("header too long for format 1.0".into()))?;

    let mut out = Vec::with_capacity(preamble + header_len + data.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&header_len_field.to_le_bytes());
    out.extend_from_slice(dict.as_bytes());
    out.extend(std::iter::repeat(b' ').take(padding));
    out.push(b'\n');
    out.extend_from_slice(&data);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(bytes: &[u8]) -> (&str, &[u8]) {
        assert_eq!(&bytes[..6], MAGIC);
        assert_eq!(&bytes[6..8], &[1, 0]);
        let len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        let header = std::str::from_utf8(&bytes[10..10 + len]).unwrap();
        (header, &bytes[10 + len..])
    }

    #[test]
    fn header_layout() {
        let bytes = encode_u8_grid(&[vec![0, 1, 2], vec![3, 4, 5]], 3).unwrap();
        let (header, data) = split(&bytes);
        assert_eq!((10 + header.len()) % 64, 0);
        assert!(header.ends_with('\n'));
        assert_eq!(header.trim_end(), "{'descr': '|u1', 'fortran_order': False, 'shape': (2, 3), }");
        assert_eq!(data, &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn empty_grid() {
        let bytes = encode_u8_grid(&[], 0).unwrap();
        let (header, data) = split(&bytes);
        assert!(header.contains("'shape': (0, 0)"));
        assert!(data.is_empty());
    }

    #[test]
    fn values_above_255_fail() {
        let err = encode_u8_grid(&[vec![255, 256]], 2).unwrap_err();
        assert!(matches!(err, StageError::Npy(ref msg) if msg.contains("256")));
    }

    #[test]
    fn ragged_rows_fail() {
        assert!(encode_u8_grid(&[vec![1, 2], vec![3]], 2).is_err());
    }
}
