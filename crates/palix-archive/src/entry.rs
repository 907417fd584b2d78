/// Type tag for archive entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    /// Serialize to a type byte for the native container.
    pub fn type_byte(&self) -> u8 {
        match self {
            Self::File => 1,
            Self::Directory => 2,
        }
    }

    /// Parse from a type byte.
    pub fn from_type_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::File),
            2 => Some(Self::Directory),
            _ => None,
        }
    }
}

/// A single flat record in an archive: a `/`-separated relative path and its
/// bytes.
///
/// Entries are transient. They are built from a tree store right before
/// container serialization, or consumed right after container parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Relative path using `/` separators.
    pub path: String,
    /// Leaf contents; always empty for directories.
    pub data: Vec<u8>,
    pub is_directory: bool,
}

impl ArchiveEntry {
    /// A leaf entry.
    pub fn file(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
            is_directory: false,
        }
    }

    /// A directory entry. Containers parsed from foreign tools may carry
    /// these; [`crate::pack`] never produces them.
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: Vec::new(),
            is_directory: true,
        }
    }

    pub fn kind(&self) -> EntryKind {
        if self.is_directory {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }

    /// Final path segment.
    pub fn file_name(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}
