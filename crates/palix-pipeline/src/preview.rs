//! Preview manifests and their rendering.
//!
//! A stage may leave a JSON manifest in its output tree that maps display
//! names to either ready-made raster bytes or an indexed image. The pipeline
//! renders every entry after packing.

use std::collections::BTreeMap;
use std::io::Cursor;

use palix_codec::{decode, IndexedImage, PixelBuffer};
use palix_store::{StoreError, StorePath};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// One manifest entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum PreviewPayload {
    /// Encoded image bytes, shown as-is.
    InlineRaster(Vec<u8>),
    /// An index grid to reconstruct.
    IndexedForm(IndexedImage),
}

/// Name to payload map, serialized as a plain JSON object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewManifest {
    entries: BTreeMap<String, PreviewPayload>,
}

impl PreviewManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, payload: PreviewPayload) {
        self.entries.insert(name.into(), payload);
    }

    pub fn get(&self, name: &str) -> Option<&PreviewPayload> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PreviewPayload)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// A preview ready for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderedPreview {
    /// Raster bytes passed through from the manifest.
    Raster(Vec<u8>),
    /// Pixels reconstructed from an indexed form.
    Pixels(PixelBuffer),
}

impl RenderedPreview {
    /// Encode as PNG. PNG rasters are returned unchanged; other raster
    /// formats are transcoded.
    pub fn to_png(&self) -> PipelineResult<Vec<u8>> {
        match self {
            Self::Raster(bytes) if bytes.starts_with(PNG_SIGNATURE) => Ok(bytes.clone()),
            Self::Raster(bytes) => {
                let img = image::load_from_memory(bytes).map_err(|e| PipelineError::DecodeFailure {
                    name: "inline raster".into(),
                    reason: e.to_string(),
                })?;
                write_png(&img)
            }
            Self::Pixels(buffer) => {
                let img = image::RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.to_rgba_bytes())
                    .ok_or_else(|| PipelineError::Render("pixel buffer size mismatch".into()))?;
                write_png(&image::DynamicImage::ImageRgba8(img))
            }
        }
    }
}

fn write_png(img: &image::DynamicImage) -> PipelineResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| PipelineError::Render(e.to_string()))?;
    Ok(out.into_inner())
}

/// Render one payload: pass raster bytes through, decode indexed forms.
pub fn render_preview(payload: &PreviewPayload) -> PipelineResult<RenderedPreview> {
    match payload {
        PreviewPayload::InlineRaster(bytes) => Ok(RenderedPreview::Raster(bytes.clone())),
        PreviewPayload::IndexedForm(image) => Ok(RenderedPreview::Pixels(decode(image)?)),
    }
}

/// Render every manifest entry, in name order.
///
/// Names end up as file names, so each must be a single valid path segment.
pub fn render_manifest(manifest: &PreviewManifest) -> PipelineResult<Vec<(String, RenderedPreview)>> {
    manifest
        .iter()
        .map(|(name, payload)| {
            check_preview_name(name)?;
            Ok((name.to_string(), render_preview(payload)?))
        })
        .collect()
}

fn check_preview_name(name: &str) -> PipelineResult<()> {
    match StorePath::root().join(name) {
        Ok(_) => Ok(()),
        Err(StoreError::InvalidPath { reason, .. }) => Err(PipelineError::InvalidPreviewName {
            name: name.to_string(),
            reason,
        }),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use palix_codec::{CodecError, Rgb, Rgba};

    use super::*;

    fn indexed() -> IndexedImage {
        IndexedImage {
            width: 2,
            height: 1,
            pixels: vec![vec![0, 1]],
            palette: vec![Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)],
        }
    }

    #[test]
    fn payload_json_shape() {
        let raster = serde_json::to_value(PreviewPayload::InlineRaster(vec![1, 2])).unwrap();
        assert_eq!(raster, serde_json::json!({"kind": "inline_raster", "data": [1, 2]}));

        let form = serde_json::to_value(PreviewPayload::IndexedForm(indexed())).unwrap();
        assert_eq!(form["kind"], "indexed_form");
        assert_eq!(form["data"]["palette"], serde_json::json!([[1, 2, 3], [4, 5, 6]]));
    }

    #[test]
    fn manifest_roundtrip() {
        let mut manifest = PreviewManifest::new();
        manifest.insert("hero", PreviewPayload::IndexedForm(indexed()));
        manifest.insert("icon", PreviewPayload::InlineRaster(vec![9]));
        let bytes = manifest.to_json().unwrap();
        assert_eq!(PreviewManifest::from_json(&bytes).unwrap(), manifest);
        assert_eq!(manifest.iter().map(|(n, _)| n).collect::<Vec<_>>(), vec!["hero", "icon"]);
    }

    #[test]
    fn unknown_kind_rejected() {
        assert!(PreviewManifest::from_json(br#"{"x": {"kind": "svg", "data": ""}}"#).is_err());
    }

    #[test]
    fn renders_indexed_form() {
        let rendered = render_preview(&PreviewPayload::IndexedForm(indexed())).unwrap();
        let RenderedPreview::Pixels(buffer) = &rendered else {
            panic!("expected pixels");
        };
        assert_eq!(buffer.samples(), &[Rgba::new(1, 2, 3, 255), Rgba::new(4, 5, 6, 255)]);

        let png = rendered.to_png().unwrap();
        let back = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(back.as_raw(), &buffer.to_rgba_bytes());
    }

    #[test]
    fn raster_passes_through() {
        let rendered = render_preview(&PreviewPayload::InlineRaster(b"opaque".to_vec())).unwrap();
        assert_eq!(rendered, RenderedPreview::Raster(b"opaque".to_vec()));
        assert!(rendered.to_png().is_err());

        let png = crate::extract::tests::two_color_png([1, 1, 1], [2, 2, 2]);
        assert_eq!(RenderedPreview::Raster(png.clone()).to_png().unwrap(), png);
    }

    #[test]
    fn manifest_names_must_be_single_segments() {
        for name in ["", ".", "..", "../up", "/etc/x", "a/b", "a\\b", "nul\0"] {
            let mut manifest = PreviewManifest::new();
            manifest.insert(name, PreviewPayload::IndexedForm(indexed()));
            let err = render_manifest(&manifest).unwrap_err();
            assert!(matches!(err, PipelineError::InvalidPreviewName { .. }), "{name:?}");
        }

        let mut manifest = PreviewManifest::new();
        manifest.insert("hero sprite.v2", PreviewPayload::IndexedForm(indexed()));
        assert_eq!(render_manifest(&manifest).unwrap()[0].0, "hero sprite.v2");
    }

    #[test]
    fn invalid_indexed_form_fails_with_codec_error() {
        let mut bad = indexed();
        bad.pixels[0][1] = 5;
        let err = render_preview(&PreviewPayload::IndexedForm(bad)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Codec(CodecError::IndexOutOfRange { x: 1, y: 0, index: 5, palette_len: 2 })
        ));
    }
}
