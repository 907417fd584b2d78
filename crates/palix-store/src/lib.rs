//! Hierarchical byte-blob stores for palix.
//!
//! A tree store holds directories and named leaves of bytes. Transformation
//! stages write their results into one; the archive bundler walks it.
//!
//! # Backends
//!
//! All backends implement the [`TreeStore`] trait:
//!
//! - [`InMemoryTreeStore`] -- `BTreeMap`-based tree for pipeline runs and tests
//! - [`FsTreeStore`] -- a directory on the host filesystem
//!
//! # Design Rules
//!
//! 1. Paths are [`StorePath`] values; they cannot contain `..`.
//! 2. Directory creation is idempotent.
//! 3. A leaf is never silently replaced by a directory, or the reverse.
//! 4. Listings are sorted, so walks are reproducible.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod path;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsTreeStore;
pub use memory::InMemoryTreeStore;
pub use path::StorePath;
pub use traits::{DirEntry, NodeKind, TreeStore};
