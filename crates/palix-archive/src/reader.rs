use std::path::Path;

use crate::entry::{ArchiveEntry, EntryKind};
use crate::error::{ArchiveError, ArchiveResult};
use crate::writer::{decode_varint, CHECKSUM_LEN, MAGIC, VERSION};

const HEADER_LEN: usize = 12;

/// Parses a native `.plxa` container.
///
/// The whole container is validated up front: magic, version and the
/// trailing BLAKE3 checksum. Entries are decoded lazily, each one checked
/// against its CRC32 and declared size.
#[derive(Debug)]
pub struct ArchiveReader {
    data: Vec<u8>,
    entry_count: u32,
}

impl ArchiveReader {
    /// Open from raw bytes.
    pub fn from_bytes(data: Vec<u8>) -> ArchiveResult<Self> {
        if data.len() < HEADER_LEN + CHECKSUM_LEN {
            return Err(ArchiveError::CorruptEntry {
                offset: 0,
                reason: "archive data too short".into(),
            });
        }
        if &data[0..4] != MAGIC {
            return Err(ArchiveError::InvalidMagic {
                expected: String::from_utf8_lossy(MAGIC).into(),
                actual: String::from_utf8_lossy(&data[0..4]).into(),
            });
        }
        let version = read_u32(&data, 4);
        if version != VERSION {
            return Err(ArchiveError::UnsupportedVersion(version));
        }

        let body_len = data.len() - CHECKSUM_LEN;
        if blake3::hash(&data[..body_len]).as_bytes() != &data[body_len..] {
            return Err(ArchiveError::ChecksumMismatch);
        }

        let entry_count = read_u32(&data, 8);
        Ok(Self { data, entry_count })
    }

    /// Open from a file on disk.
    pub fn open(path: &Path) -> ArchiveResult<Self> {
        Self::from_bytes(std::fs::read(path)?)
    }

    /// Entry count declared in the header.
    pub fn entry_count(&self) -> usize {
        self.entry_count as usize
    }

    /// BLAKE3 checksum stored in the trailer.
    pub fn checksum(&self) -> &[u8] {
        &self.data[self.data.len() - CHECKSUM_LEN..]
    }

    /// Decode every entry, in stored order.
    pub fn entries(&self) -> ArchiveResult<Vec<ArchiveEntry>> {
        let body = &self.data[..self.data.len() - CHECKSUM_LEN];
        let mut entries = Vec::with_capacity(self.entry_count());
        let mut pos = HEADER_LEN;
        for _ in 0..self.entry_count {
            let (entry, next) = read_entry(body, pos)?;
            entries.push(entry);
            pos = next;
        }
        if pos != body.len() {
            return Err(ArchiveError::CorruptEntry {
                offset: pos as u64,
                reason: format!("{} trailing bytes after last entry", body.len() - pos),
            });
        }
        Ok(entries)
    }
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn take<'a>(data: &'a [u8], pos: usize, len: u64, offset: u64, what: &str) -> ArchiveResult<&'a [u8]> {
    let end = usize::try_from(len)
        .ok()
        .and_then(|len| pos.checked_add(len))
        .filter(|&end| end <= data.len())
        .ok_or_else(|| ArchiveError::CorruptEntry {
            offset,
            reason: format!("{what} extends beyond archive"),
        })?;
    Ok(&data[pos..end])
}

fn read_entry(data: &[u8], start: usize) -> ArchiveResult<(ArchiveEntry, usize)> {
    let offset = start as u64;
    let mut pos = start;

    let type_byte = *data.get(pos).ok_or_else(|| ArchiveError::CorruptEntry {
        offset,
        reason: "entry header beyond archive".into(),
    })?;
    pos += 1;
    let kind = EntryKind::from_type_byte(type_byte).ok_or_else(|| ArchiveError::CorruptEntry {
        offset,
        reason: format!("unknown type byte: {type_byte}"),
    })?;

    let (path_len, consumed) = decode_varint(&data[pos..], offset)?;
    pos += consumed;
    let path_bytes = take(data, pos, path_len, offset, "path")?;
    pos += path_bytes.len();
    let path = String::from_utf8(path_bytes.to_vec()).map_err(|_| ArchiveError::CorruptEntry {
        offset,
        reason: "path is not UTF-8".into(),
    })?;

    let (raw_size, consumed) = decode_varint(&data[pos..], offset)?;
    pos += consumed;
    let (compressed_size, consumed) = decode_varint(&data[pos..], offset)?;
    pos += consumed;

    let crc_bytes = take(data, pos, 4, offset, "CRC")?;
    let expected_crc = read_u32(crc_bytes, 0);
    pos += 4;

    let compressed = take(data, pos, compressed_size, offset, "compressed data")?;
    pos += compressed.len();

    if crc32fast::hash(compressed) != expected_crc {
        return Err(ArchiveError::CrcMismatch { path });
    }

    let decompressed =
        zstd::decode_all(compressed).map_err(|e| ArchiveError::DecompressionFailed(e.to_string()))?;
    if decompressed.len() as u64 != raw_size {
        return Err(ArchiveError::CorruptEntry {
            offset,
            reason: format!(
                "size mismatch: expected {raw_size}, got {}",
                decompressed.len()
            ),
        });
    }

    let entry = match kind {
        EntryKind::File => ArchiveEntry::file(path, decompressed),
        EntryKind::Directory => ArchiveEntry::directory(path),
    };
    Ok((entry, pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::ArchiveWriter;

    fn build(entries: Vec<ArchiveEntry>) -> Vec<u8> {
        let mut writer = ArchiveWriter::new();
        writer.extend(entries);
        writer.finish_to_bytes().unwrap()
    }

    /// Recompute the trailer after tampering with the body.
    fn reseal(bytes: &mut Vec<u8>) {
        let body_len = bytes.len() - CHECKSUM_LEN;
        let checksum = *blake3::hash(&bytes[..body_len]).as_bytes();
        bytes[body_len..].copy_from_slice(&checksum);
    }

    #[test]
    fn roundtrip_preserves_order_and_kinds() {
        let entries = vec![
            ArchiveEntry::file("b.txt", b"bee".to_vec()),
            ArchiveEntry::directory("dir"),
            ArchiveEntry::file("a/nested.bin", vec![0u8; 1000]),
            ArchiveEntry::file("empty", Vec::new()),
        ];
        let reader = ArchiveReader::from_bytes(build(entries.clone())).unwrap();
        assert_eq!(reader.entry_count(), 4);
        assert_eq!(reader.entries().unwrap(), entries);
    }

    #[test]
    fn empty_archive() {
        let reader = ArchiveReader::from_bytes(build(Vec::new())).unwrap();
        assert_eq!(reader.entry_count(), 0);
        assert!(reader.entries().unwrap().is_empty());
    }

    #[test]
    fn bad_magic() {
        let mut bytes = build(Vec::new());
        bytes[0..4].copy_from_slice(b"BADM");
        let err = ArchiveReader::from_bytes(bytes).unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidMagic { .. }));
    }

    #[test]
    fn bad_version() {
        let mut bytes = build(Vec::new());
        bytes[4..8].copy_from_slice(&99u32.to_be_bytes());
        let err = ArchiveReader::from_bytes(bytes).unwrap_err();
        assert!(matches!(err, ArchiveError::UnsupportedVersion(99)));
    }

    #[test]
    fn too_short() {
        let err = ArchiveReader::from_bytes(vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, ArchiveError::CorruptEntry { .. }));
    }

    #[test]
    fn tampered_body_fails_checksum() {
        let mut bytes = build(vec![ArchiveEntry::file("x", b"payload".to_vec())]);
        let last_body_byte = bytes.len() - CHECKSUM_LEN - 1;
        bytes[last_body_byte] ^= 0xFF;
        let err = ArchiveReader::from_bytes(bytes).unwrap_err();
        assert!(matches!(err, ArchiveError::ChecksumMismatch));
    }

    #[test]
    fn tampered_data_fails_crc() {
        let mut bytes = build(vec![ArchiveEntry::file("x", b"payload".to_vec())]);
        let last_body_byte = bytes.len() - CHECKSUM_LEN - 1;
        bytes[last_body_byte] ^= 0xFF;
        reseal(&mut bytes);
        let reader = ArchiveReader::from_bytes(bytes).unwrap();
        let err = reader.entries().unwrap_err();
        assert!(matches!(err, ArchiveError::CrcMismatch { ref path } if path == "x"));
    }

    #[test]
    fn inflated_count_is_corrupt() {
        let mut bytes = build(vec![ArchiveEntry::file("x", b"1".to_vec())]);
        bytes[8..12].copy_from_slice(&2u32.to_be_bytes());
        reseal(&mut bytes);
        let reader = ArchiveReader::from_bytes(bytes).unwrap();
        assert!(matches!(
            reader.entries().unwrap_err(),
            ArchiveError::CorruptEntry { .. }
        ));
    }

    #[test]
    fn disk_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.plxa");
        let mut writer = ArchiveWriter::new();
        writer.add_entry(ArchiveEntry::file("sub/a.bin", vec![1, 2, 3]));
        let file = writer.finish(&path).unwrap();
        assert_eq!(file.entry_count, 1);
        assert!(file.path.exists());

        let reader = ArchiveReader::open(&path).unwrap();
        assert_eq!(reader.checksum(), &file.checksum);
        assert_eq!(
            reader.entries().unwrap(),
            vec![ArchiveEntry::file("sub/a.bin", vec![1, 2, 3])]
        );
    }

    #[test]
    fn compression_shrinks_repetitive_data() {
        let bytes = build(vec![ArchiveEntry::file("big", vec![0xAB; 100_000])]);
        assert!(bytes.len() < 100_000);
    }
}
