//! Turning uploaded entries into a [`NamedBundle`].

use palix_archive::ArchiveEntry;
use palix_codec::{encode, IndexedImage, PixelBuffer};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::bundle::NamedBundle;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::naming::{is_recognized_image, sanitize_name};

/// Decode raster bytes in any format the `image` crate understands.
pub fn decode_raster(name: &str, bytes: &[u8]) -> PipelineResult<PixelBuffer> {
    let rgba = image::load_from_memory(bytes)
        .map_err(|e| PipelineError::DecodeFailure {
            name: name.to_string(),
            reason: e.to_string(),
        })?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(PixelBuffer::from_rgba_bytes(width, height, rgba.as_raw())?)
}

/// Decode and index one raster.
pub fn index_raster(name: &str, bytes: &[u8]) -> PipelineResult<IndexedImage> {
    let buffer = decode_raster(name, bytes)?;
    let image = encode(&buffer);
    debug!(name, width = image.width, height = image.height, colors = image.color_count(), "indexed image");
    Ok(image)
}

/// Index every recognized image among `entries`.
///
/// Images are decoded in parallel when `config.parallel` is set, then merged
/// in input order: the first failure in input order aborts the whole call,
/// and when two inputs sanitize to the same name the later one wins.
pub fn extract_bundle(entries: &[ArchiveEntry], config: &PipelineConfig) -> PipelineResult<NamedBundle> {
    let images: Vec<&ArchiveEntry> = entries
        .iter()
        .filter(|e| {
            !e.is_directory
                && is_recognized_image(&e.path, &config.image_extension, config.case_sensitive_extension)
        })
        .collect();
    if images.is_empty() {
        return Err(PipelineError::InvalidInput(format!(
            "no {} images among {} entries",
            config.image_extension,
            entries.len()
        )));
    }

    let index = |entry: &&ArchiveEntry| index_raster(&entry.path, &entry.data);
    let indexed: Vec<PipelineResult<IndexedImage>> = if config.parallel {
        images.par_iter().map(index).collect()
    } else {
        images.iter().map(index).collect()
    };

    let mut bundle = NamedBundle::new();
    for (entry, result) in images.iter().zip(indexed) {
        let image = result?;
        let name = sanitize_name(&entry.path, &config.image_extension, config.case_sensitive_extension);
        if bundle.insert(name.clone(), image).is_some() {
            warn!(%name, path = %entry.path, "image name collision, later input replaces earlier one");
        }
    }
    debug!(images = bundle.len(), "extracted bundle");
    Ok(bundle)
}
