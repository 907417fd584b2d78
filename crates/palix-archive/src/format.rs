use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entry::ArchiveEntry;
use crate::error::{ArchiveError, ArchiveResult};
use crate::reader::ArchiveReader;
use crate::tarzst::{read_tar_zst, write_tar_zst};
use crate::writer::ArchiveWriter;

/// Container encodings an entry list can be serialized to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerFormat {
    /// Checksummed `.plxa` container.
    #[default]
    Native,
    /// zstd-compressed tar.
    TarZst,
}

impl ContainerFormat {
    /// Conventional file extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Native => "plxa",
            Self::TarZst => "tar.zst",
        }
    }

    /// Guess the format from a file name.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(".plxa") {
            Some(Self::Native)
        } else if name.ends_with(".tar.zst") || name.ends_with(".tzst") {
            Some(Self::TarZst)
        } else {
            None
        }
    }

    /// Guess the format from a path, failing on unknown extensions.
    pub fn from_path(path: &Path) -> ArchiveResult<Self> {
        let name = path.to_string_lossy();
        Self::from_file_name(&name).ok_or_else(|| ArchiveError::UnknownFormat(name.into_owned()))
    }

    /// Serialize entries, in order.
    pub fn encode(&self, entries: &[ArchiveEntry]) -> ArchiveResult<Vec<u8>> {
        match self {
            Self::Native => {
                let mut writer = ArchiveWriter::new();
                writer.extend(entries.iter().cloned());
                writer.finish_to_bytes()
            }
            Self::TarZst => write_tar_zst(entries),
        }
    }

    /// Parse entries, in stored order.
    pub fn decode(&self, data: Vec<u8>) -> ArchiveResult<Vec<ArchiveEntry>> {
        match self {
            Self::Native => ArchiveReader::from_bytes(data)?.entries(),
            Self::TarZst => read_tar_zst(&data),
        }
    }
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::TarZst => write!(f, "tar-zst"),
        }
    }
}

impl FromStr for ContainerFormat {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" | "plxa" => Ok(Self::Native),
            "tar-zst" | "tar.zst" | "tzst" => Ok(Self::TarZst),
            other => Err(ArchiveError::UnknownFormat(other.to_string())),
        }
    }
}

/// Read an archive file, picking the format from its extension.
pub fn read_archive(path: &Path) -> ArchiveResult<Vec<ArchiveEntry>> {
    let format = ContainerFormat::from_path(path)?;
    format.decode(std::fs::read(path)?)
}

/// Write entries to `path` in the given format. Returns the byte size.
pub fn write_archive(
    path: &Path,
    format: ContainerFormat,
    entries: &[ArchiveEntry],
) -> ArchiveResult<u64> {
    let bytes = format.encode(entries)?;
    std::fs::write(path, &bytes)?;
    tracing::debug!(path = %path.display(), %format, entries = entries.len(), "wrote archive");
    Ok(bytes.len() as u64)
}
