//! Archive bundling for palix.
//!
//! Turns a [`TreeStore`](palix_store::TreeStore) subtree into a flat list of
//! [`ArchiveEntry`] values and back, and serializes entry lists into a
//! container.
//!
//! # Containers
//!
//! - Native `.plxa`: per-entry zstd + CRC32, BLAKE3 trailer over the whole file
//! - `.tar.zst`: reproducible tar headers inside a zstd stream
//!
//! # Design Rules
//!
//! 1. Packing walks children in sorted order, so entry order is stable.
//! 2. Unpacking validates every path before the first write.
//! 3. A path that could escape the target root fails the whole unpack.

pub mod bundler;
pub mod entry;
pub mod error;
pub mod format;
pub mod reader;
pub mod tarzst;
pub mod writer;

pub use bundler::{entry_path, pack, unpack, unpack_to_memory, UnpackReport};
pub use entry::{ArchiveEntry, EntryKind};
pub use error::{ArchiveError, ArchiveResult};
pub use format::{read_archive, write_archive, ContainerFormat};
pub use reader::ArchiveReader;
pub use tarzst::{read_tar_zst, read_tar_zst_file, write_tar_zst, write_tar_zst_file};
pub use writer::{ArchiveFile, ArchiveWriter};
