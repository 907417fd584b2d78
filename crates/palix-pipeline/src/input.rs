//! Gathering uploaded entries from host paths.

use std::path::Path;

use palix_archive::{pack, read_archive, ArchiveEntry, ContainerFormat};
use palix_store::{FsTreeStore, StorePath};
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};

/// Turn host paths into input entries, in argument order.
///
/// A directory contributes every file below it (paths relative to the
/// directory); a recognized archive contributes its entries; any other file
/// becomes one entry named after its file name.
pub fn collect_inputs<P: AsRef<Path>>(paths: &[P]) -> PipelineResult<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let before = entries.len();
        if path.is_dir() {
            let store = FsTreeStore::open(path)?;
            entries.extend(pack(&store, &StorePath::root())?);
        } else if ContainerFormat::from_file_name(&path.to_string_lossy()).is_some() {
            entries.extend(read_archive(path)?);
        } else {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| PipelineError::InvalidInput(format!("{} has no file name", path.display())))?;
            entries.push(ArchiveEntry::file(name, std::fs::read(path)?));
        }
        debug!(path = %path.display(), entries = entries.len() - before, "collected input");
    }
    Ok(entries)
}
