//! zstd-compressed tar containers.
//!
//! Headers are written reproducibly (fixed mode, zero mtime), so the same
//! entries always produce the same bytes. Paths are returned exactly as
//! stored; path safety is the job of [`crate::unpack`].

use std::io::{Read, Write};
use std::path::Path;

use tar::{Archive, Builder, EntryType, Header};

use crate::entry::ArchiveEntry;
use crate::error::{ArchiveError, ArchiveResult};

const ZSTD_LEVEL: i32 = 3;

/// Serialize entries into a `.tar.zst` byte buffer.
pub fn write_tar_zst(entries: &[ArchiveEntry]) -> ArchiveResult<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let encoder = zstd::Encoder::new(&mut buffer, ZSTD_LEVEL)
            .map_err(|e| ArchiveError::CompressionFailed(format!("zstd encoder: {e}")))?;
        let mut builder = Builder::new(encoder.auto_finish());
        for entry in entries {
            append(&mut builder, entry)?;
        }
        let encoder = builder
            .into_inner()
            .map_err(|e| ArchiveError::Tar(format!("tar finish: {e}")))?;
        drop(encoder);
    }
    Ok(buffer)
}

/// Parse a `.tar.zst` byte buffer into entries, in stored order.
///
/// Symlinks, hard links and other special members are skipped.
pub fn read_tar_zst(data: &[u8]) -> ArchiveResult<Vec<ArchiveEntry>> {
    let decoder = zstd::Decoder::new(data)
        .map_err(|e| ArchiveError::DecompressionFailed(format!("zstd decoder: {e}")))?;
    let mut archive = Archive::new(decoder);
    let mut entries = Vec::new();

    for member in archive
        .entries()
        .map_err(|e| ArchiveError::Tar(e.to_string()))?
    {
        let mut member = member.map_err(|e| ArchiveError::Tar(e.to_string()))?;
        let path = String::from_utf8_lossy(&member.path_bytes()).into_owned();
        match member.header().entry_type() {
            EntryType::Directory => {
                entries.push(ArchiveEntry::directory(path.trim_end_matches('/')));
            }
            EntryType::Regular | EntryType::Continuous => {
                let mut data = Vec::new();
                member
                    .read_to_end(&mut data)
                    .map_err(|e| ArchiveError::Tar(format!("read {path}: {e}")))?;
                entries.push(ArchiveEntry::file(path, data));
            }
            other => {
                tracing::warn!(%path, kind = ?other, "skipping unsupported tar member");
            }
        }
    }
    Ok(entries)
}

/// Write a `.tar.zst` container to disk.
pub fn write_tar_zst_file(path: &Path, entries: &[ArchiveEntry]) -> ArchiveResult<u64> {
    let bytes = write_tar_zst(entries)?;
    std::fs::write(path, &bytes)?;
    Ok(bytes.len() as u64)
}

/// Read a `.tar.zst` container from disk.
pub fn read_tar_zst_file(path: &Path) -> ArchiveResult<Vec<ArchiveEntry>> {
    read_tar_zst(&std::fs::read(path)?)
}

fn append<W: Write>(builder: &mut Builder<W>, entry: &ArchiveEntry) -> ArchiveResult<()> {
    let mut header = Header::new_gnu();
    if entry.is_directory {
        header.set_entry_type(EntryType::Directory);
        header.set_mode(0o755);
        header.set_size(0);
    } else {
        header.set_entry_type(EntryType::Regular);
        header.set_mode(0o644);
        header.set_size(entry.data.len() as u64);
    }
    header.set_mtime(0);

    // append_data handles long names and sets the checksum.
    builder
        .append_data(&mut header, &entry.path, entry.data.as_slice())
        .map_err(|e| ArchiveError::Tar(format!("append {:?}: {e}", entry.path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ArchiveEntry> {
        vec![
            ArchiveEntry::file("Base.pal", b"JASC-PAL\n0100\n0".to_vec()),
            ArchiveEntry::directory("nested"),
            ArchiveEntry::file("nested/deep/x.npy", vec![7u8; 300]),
        ]
    }

    #[test]
    fn roundtrip() {
        let bytes = write_tar_zst(&sample()).unwrap();
        assert_eq!(read_tar_zst(&bytes).unwrap(), sample());
    }

    #[test]
    fn output_is_reproducible() {
        assert_eq!(
            write_tar_zst(&sample()).unwrap(),
            write_tar_zst(&sample()).unwrap()
        );
    }

    #[test]
    fn raw_tar_inside() {
        let bytes = write_tar_zst(&sample()).unwrap();
        let tar_data = zstd::decode_all(bytes.as_slice()).unwrap();
        let mut archive = tar::Archive::new(&tar_data[..]);
        let mtimes: Vec<u64> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().header().mtime().unwrap())
            .collect();
        assert_eq!(mtimes, vec![0, 0, 0]);
    }

    #[test]
    fn long_paths_survive() {
        let long = format!("{}/file.bin", "d".repeat(150));
        let entries = vec![ArchiveEntry::file(long, b"x".to_vec())];
        let bytes = write_tar_zst(&entries).unwrap();
        assert_eq!(read_tar_zst(&bytes).unwrap(), entries);
    }

    #[test]
    fn empty_archive() {
        let bytes = write_tar_zst(&[]).unwrap();
        assert!(read_tar_zst(&bytes).unwrap().is_empty());
    }

    #[test]
    fn garbage_fails() {
        assert!(read_tar_zst(b"definitely not zstd").is_err());
    }

    #[test]
    fn disk_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tar.zst");
        let size = write_tar_zst_file(&path, &sample()).unwrap();
        assert_eq!(size, std::fs::metadata(&path).unwrap().len());
        assert_eq!(read_tar_zst_file(&path).unwrap(), sample());
    }
}
