use std::path::{Path, PathBuf};

use crate::entry::ArchiveEntry;
use crate::error::{ArchiveError, ArchiveResult};

pub(crate) const MAGIC: &[u8; 4] = b"PLXA";
pub(crate) const VERSION: u32 = 1;
pub(crate) const CHECKSUM_LEN: usize = 32;
const ZSTD_LEVEL: i32 = 3;

/// Result of writing an archive to disk.
#[derive(Clone, Debug)]
pub struct ArchiveFile {
    pub path: PathBuf,
    pub entry_count: usize,
    pub size: u64,
    pub checksum: [u8; 32],
}

/// Builds a native `.plxa` container from archive entries.
///
/// Layout: `PLXA`, version and entry count (u32 BE), then per entry a type
/// byte, varint path length, path, varint raw size, varint compressed size,
/// CRC32 of the compressed bytes (u32 BE) and the zstd data. A BLAKE3 hash of
/// everything before it closes the file.
#[derive(Debug, Default)]
pub struct ArchiveWriter {
    entries: Vec<ArchiveEntry>,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one entry. Entries are written in insertion order.
    pub fn add_entry(&mut self, entry: ArchiveEntry) {
        self.entries.push(entry);
    }

    /// Queue every entry from an iterator.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = ArchiveEntry>) {
        self.entries.extend(entries);
    }

    /// Number of entries queued.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the container in memory.
    pub fn finish_to_bytes(self) -> ArchiveResult<Vec<u8>> {
        let mut out = Vec::new();

        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_be_bytes());
        let count = u32::try_from(self.entries.len()).map_err(|_| {
            ArchiveError::CompressionFailed("too many entries for one archive".into())
        })?;
        out.extend_from_slice(&count.to_be_bytes());

        for entry in &self.entries {
            out.push(entry.kind().type_byte());

            encode_varint(&mut out, entry.path.len() as u64);
            out.extend_from_slice(entry.path.as_bytes());

            let compressed = zstd::encode_all(entry.data.as_slice(), ZSTD_LEVEL)
                .map_err(|e| ArchiveError::CompressionFailed(e.to_string()))?;

            encode_varint(&mut out, entry.data.len() as u64);
            encode_varint(&mut out, compressed.len() as u64);
            out.extend_from_slice(&crc32fast::hash(&compressed).to_be_bytes());
            out.extend_from_slice(&compressed);
        }

        let checksum = *blake3::hash(&out).as_bytes();
        out.extend_from_slice(&checksum);
        Ok(out)
    }

    /// Write the container to `path`.
    pub fn finish(self, path: &Path) -> ArchiveResult<ArchiveFile> {
        let entry_count = self.entries.len();
        let bytes = self.finish_to_bytes()?;
        let mut checksum = [0u8; CHECKSUM_LEN];
        checksum.copy_from_slice(&bytes[bytes.len() - CHECKSUM_LEN..]);
        std::fs::write(path, &bytes)?;
        tracing::debug!(path = %path.display(), entry_count, size = bytes.len(), "wrote archive");
        Ok(ArchiveFile {
            path: path.to_path_buf(),
            entry_count,
            size: bytes.len() as u64,
            checksum,
        })
    }
}

/// Encode a u64 as a variable-length integer.
pub(crate) fn encode_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Decode a variable-length integer. Returns (value, bytes_consumed).
pub(crate) fn decode_varint(data: &[u8], offset: u64) -> ArchiveResult<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift = 0;
    for (i, &byte) in data.iter().enumerate() {
        if shift >= 64 {
            return Err(ArchiveError::CorruptEntry {
                offset,
                reason: "varint overflow".into(),
            });
        }
        value |= ((byte & 0x7F) as u64) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(ArchiveError::CorruptEntry {
        offset,
        reason: "truncated varint".into(),
    })
}
