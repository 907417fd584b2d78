//! Flattening a tree store into archive entries, and rebuilding one.

use palix_store::{InMemoryTreeStore, NodeKind, StoreError, StorePath, TreeStore};
use rayon::prelude::*;
use tracing::debug;

use crate::entry::ArchiveEntry;
use crate::error::{ArchiveError, ArchiveResult};

/// Counts from an [`unpack`] run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnpackReport {
    /// Leaves written.
    pub files_written: usize,
    /// Directories that did not exist before.
    pub directories_created: usize,
    /// Entries with an empty path.
    pub entries_skipped: usize,
}

/// Walk the tree under `root` and emit one entry per leaf.
///
/// Entry paths are relative to `root`. Children are visited in sorted order
/// and independent subtrees are walked in parallel; the result is the same
/// as a sequential depth-first walk. Directories produce no entries, so empty
/// directories do not survive packing.
pub fn pack(store: &dyn TreeStore, root: &StorePath) -> ArchiveResult<Vec<ArchiveEntry>> {
    match store.node_kind(root)? {
        Some(NodeKind::Directory) => {}
        Some(NodeKind::File) => return Err(StoreError::NotADirectory(root.clone()).into()),
        None => return Err(StoreError::NotFound(root.clone()).into()),
    }

    let entries = walk(store, root, &StorePath::root())?;
    debug!(%root, entries = entries.len(), "packed tree");
    Ok(entries)
}

fn walk(
    store: &dyn TreeStore,
    dir: &StorePath,
    relative: &StorePath,
) -> ArchiveResult<Vec<ArchiveEntry>> {
    let children = store.list_dir(dir)?;
    let parts = children
        .par_iter()
        .map(|child| -> ArchiveResult<Vec<ArchiveEntry>> {
            let path = dir.join(&child.name)?;
            let rel = relative.join(&child.name)?;
            match child.kind {
                NodeKind::Directory => walk(store, &path, &rel),
                NodeKind::File => {
                    let data = store
                        .read_file(&path)?
                        .ok_or_else(|| StoreError::NotFound(path.clone()))?;
                    Ok(vec![ArchiveEntry::file(rel.to_relative_string(), data)])
                }
            }
        })
        .collect::<ArchiveResult<Vec<Vec<ArchiveEntry>>>>()?;
    Ok(parts.into_iter().flatten().collect())
}

/// Materialize entries under `target_root` in `store`.
///
/// Every path is checked before anything is written: an absolute path, a
/// `..` segment, a backslash or a NUL byte fails the whole call with
/// [`ArchiveError::PathTraversal`] and leaves the store untouched. Missing
/// directories are created; existing ones are reused.
pub fn unpack(
    entries: &[ArchiveEntry],
    store: &dyn TreeStore,
    target_root: &StorePath,
) -> ArchiveResult<UnpackReport> {
    let resolved = entries
        .iter()
        .map(|entry| entry_path(&entry.path).map(|path| (entry, path)))
        .collect::<ArchiveResult<Vec<_>>>()?;

    let mut report = UnpackReport::default();
    create_dirs(store, target_root, &mut report)?;

    for (entry, relative) in resolved {
        if relative.is_root() {
            report.entries_skipped += 1;
            continue;
        }
        let full = target_root.concat(&relative);
        if entry.is_directory {
            create_dirs(store, &full, &mut report)?;
            continue;
        }
        if let Some(parent) = full.parent() {
            create_dirs(store, &parent, &mut report)?;
        }
        store.write_file(&full, &entry.data).map_err(conflict)?;
        report.files_written += 1;
    }

    debug!(
        root = %target_root,
        files = report.files_written,
        dirs = report.directories_created,
        "unpacked entries"
    );
    Ok(report)
}

/// Unpack into a fresh in-memory store rooted at the store root.
pub fn unpack_to_memory(entries: &[ArchiveEntry]) -> ArchiveResult<InMemoryTreeStore> {
    let store = InMemoryTreeStore::new();
    unpack(entries, &store, &StorePath::root())?;
    Ok(store)
}

/// Validate an entry path and turn it into relative store segments.
pub fn entry_path(path: &str) -> ArchiveResult<StorePath> {
    let escapes = path.starts_with('/')
        || path.contains('\\')
        || path.contains('\0')
        || path.split('/').any(|segment| segment == "..");
    if escapes {
        return Err(ArchiveError::PathTraversal(path.to_string()));
    }
    StorePath::parse(path).map_err(|_| ArchiveError::PathTraversal(path.to_string()))
}

fn create_dirs(
    store: &dyn TreeStore,
    dir: &StorePath,
    report: &mut UnpackReport,
) -> ArchiveResult<()> {
    for prefix in dir.prefixes() {
        if store.create_dir(&prefix).map_err(conflict)? {
            report.directories_created += 1;
        }
    }
    Ok(())
}

fn conflict(err: StoreError) -> ArchiveError {
    match err {
        StoreError::NotADirectory(path) | StoreError::IsADirectory(path) => {
            ArchiveError::DirectoryCreationConflict(path.to_string())
        }
        other => ArchiveError::Store(other),
    }
}
