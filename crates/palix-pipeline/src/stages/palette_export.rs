use std::collections::HashMap;

use palix_codec::{to_jasc_pal, IndexedImage};
use palix_store::{StorePath, TreeStore};
use tracing::{debug, warn};

use crate::config::PaletteExportConfig;
use crate::error::StageError;
use crate::npy::encode_u8_grid;
use crate::preview::{PreviewManifest, PreviewPayload};
use crate::stage::{StageInput, StageReport, TransformStage};

/// Exports palettes as JASC-PAL text and index grids as `.npy` arrays.
///
/// When the bundle holds the reference image, its palette is written as
/// `<reference>.pal` and every other image's indices are renumbered by their
/// position among the reference's sorted distinct indices; indices the
/// reference never uses are kept as they are. Images using more than
/// `max_colors` distinct indices are skipped. A preview manifest with the
/// indexed form of every exported image is written alongside.
pub struct PaletteExportStage {
    config: PaletteExportConfig,
    manifest: String,
}

impl PaletteExportStage {
    /// `manifest` is the manifest's `/`-separated path relative to the
    /// output root.
    pub fn new(config: PaletteExportConfig, manifest: impl Into<String>) -> Self {
        Self {
            config,
            manifest: manifest.into(),
        }
    }

    fn write(
        &self,
        output: &dyn TreeStore,
        root: &StorePath,
        name: &str,
        data: &[u8],
        report: &mut StageReport,
    ) -> Result<(), StageError> {
        output.write_file(&root.join(name)?, data)?;
        report.wrote();
        Ok(())
    }
}

impl Default for PaletteExportStage {
    fn default() -> Self {
        Self::new(PaletteExportConfig::default(), "preview.json")
    }
}

impl TransformStage for PaletteExportStage {
    fn name(&self) -> &str {
        "palette-export"
    }

    fn run(
        &self,
        input: StageInput<'_>,
        output: &dyn TreeStore,
        output_root: &StorePath,
    ) -> Result<StageReport, StageError> {
        let StageInput::Indexed(bundle) = input else {
            return Err(StageError::UnsupportedInput(format!(
                "palette export needs indexed images, got {} input",
                input.kind()
            )));
        };

        output.create_dir_all(output_root)?;
        let mut report = StageReport::default();
        let mut manifest = PreviewManifest::new();
        let reference_name = self.config.reference_name.as_str();

        let remap = match bundle.get(reference_name) {
            Some(reference) => {
                let pal = to_jasc_pal(&reference.palette);
                self.write(output, output_root, &format!("{reference_name}.pal"), pal.as_bytes(), &mut report)?;
                manifest.insert(reference_name, PreviewPayload::IndexedForm(reference.clone()));
                Some(reference_map(reference))
            }
            None => {
                debug!(reference = reference_name, "no reference image, exporting raw indices");
                None
            }
        };

        for (name, image) in bundle.iter().filter(|(name, _)| *name != reference_name) {
            let used = image.used_indices().len();
            if used > self.config.max_colors {
                warn!(%name, colors = used, limit = self.config.max_colors, "image uses too many colors, skipping");
                report.skip(name);
                continue;
            }

            let pal = to_jasc_pal(&image.palette);
            let (pal_name, npy_name, grid) = match &remap {
                Some(map) => (
                    format!("{name}.pal"),
                    format!("{name}_output.npy"),
                    remap_grid(image, map),
                ),
                None => (
                    format!("{name}_no_base.pal"),
                    format!("{name}_raw.npy"),
                    image.pixels.clone(),
                ),
            };
            self.write(output, output_root, &pal_name, pal.as_bytes(), &mut report)?;
            let npy = encode_u8_grid(&grid, image.width)?;
            self.write(output, output_root, &npy_name, &npy, &mut report)?;
            manifest.insert(name, PreviewPayload::IndexedForm(image.clone()));
        }

        let manifest_path = output_root.concat(&StorePath::parse(&self.manifest)?);
        output.write_file_all(&manifest_path, &manifest.to_json()?)?;
        report.wrote();
        debug!(files = report.files_written, skipped = report.skipped.len(), "palette export done");
        Ok(report)
    }
}

/// Old index to position among the reference's sorted distinct indices.
fn reference_map(reference: &IndexedImage) -> HashMap<u32, u32> {
    reference
        .used_indices()
        .into_iter()
        .zip(0u32..)
        .collect()
}

fn remap_grid(image: &IndexedImage, map: &HashMap<u32, u32>) -> Vec<Vec<u32>> {
    image
        .pixels
        .iter()
        .map(|row| row.iter().map(|i| map.get(i).copied().unwrap_or(*i)).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use palix_codec::{parse_jasc_pal, Rgb};
    use palix_store::InMemoryTreeStore;

    use super::*;
    use crate::bundle::NamedBundle;

    fn p(s: &str) -> StorePath {
        StorePath::parse(s).unwrap()
    }

    fn image(pixels: Vec<Vec<u32>>, colors: usize) -> IndexedImage {
        IndexedImage {
            width: pixels.first().map_or(0, |r| r.len() as u32),
            height: pixels.len() as u32,
            pixels,
            palette: (0..colors).map(|i| Rgb::new(i as u8, 0, 0)).collect(),
        }
    }

    fn npy_data(bytes: &[u8]) -> &[u8] {
        let len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        &bytes[10 + len..]
    }

    fn run(bundle: &NamedBundle) -> (InMemoryTreeStore, StageReport) {
        let store = InMemoryTreeStore::new();
        let report = PaletteExportStage::default()
            .run(StageInput::Indexed(bundle), &store, &p("output"))
            .unwrap();
        (store, report)
    }

    fn listing(store: &InMemoryTreeStore) -> Vec<String> {
        store
            .list_dir(&p("output"))
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect()
    }

    #[test]
    fn exports_with_reference() {
        let mut bundle = NamedBundle::new();
        // Reference uses indices {0, 2, 5}.
        bundle.insert("Base", image(vec![vec![5, 0, 2]], 6));
        bundle.insert("hero", image(vec![vec![0, 2], vec![5, 3]], 6));
        let (store, report) = run(&bundle);

        assert_eq!(
            listing(&store),
            vec!["Base.pal", "hero.pal", "hero_output.npy", "preview.json"]
        );
        assert_eq!(report.files_written, 4);

        let pal = store.read_file(&p("output/Base.pal")).unwrap().unwrap();
        let pal = String::from_utf8(pal).unwrap();
        assert!(pal.starts_with("JASC-PAL\n0100\n6\n0 0 0\n"));
        assert_eq!(parse_jasc_pal(&pal).unwrap().len(), 6);

        let npy = store.read_file(&p("output/hero_output.npy")).unwrap().unwrap();
        // 0 -> 0, 2 -> 1, 5 -> 2, 3 is not in the reference and stays.
        assert_eq!(npy_data(&npy), &[0, 1, 2, 3]);
    }

    #[test]
    fn exports_without_reference() {
        let mut bundle = NamedBundle::new();
        bundle.insert("hero", image(vec![vec![1, 0]], 2));
        let (store, _) = run(&bundle);
        assert_eq!(
            listing(&store),
            vec!["hero_no_base.pal", "hero_raw.npy", "preview.json"]
        );
        let npy = store.read_file(&p("output/hero_raw.npy")).unwrap().unwrap();
        assert_eq!(npy_data(&npy), &[1, 0]);
    }

    #[test]
    fn skips_images_over_the_color_limit() {
        let mut bundle = NamedBundle::new();
        let wide: Vec<u32> = (0..17).collect();
        bundle.insert("busy", image(vec![wide], 17));
        bundle.insert("calm", image(vec![vec![0; 4]], 1));
        let (store, report) = run(&bundle);
        assert_eq!(report.skipped, vec!["busy".to_string()]);
        assert!(!store.exists(&p("output/busy_no_base.pal")).unwrap());
        assert!(store.exists(&p("output/calm_no_base.pal")).unwrap());
    }

    #[test]
    fn reference_is_not_color_limited() {
        let mut bundle = NamedBundle::new();
        let wide: Vec<u32> = (0..20).collect();
        bundle.insert("Base", image(vec![wide], 20));
        let (store, report) = run(&bundle);
        assert!(report.skipped.is_empty());
        assert_eq!(listing(&store), vec!["Base.pal", "preview.json"]);
    }

    #[test]
    fn manifest_holds_exported_images() {
        let mut bundle = NamedBundle::new();
        bundle.insert("Base", image(vec![vec![0]], 1));
        bundle.insert("hero", image(vec![vec![0]], 1));
        let (store, _) = run(&bundle);
        let bytes = store.read_file(&p("output/preview.json")).unwrap().unwrap();
        let manifest = PreviewManifest::from_json(&bytes).unwrap();
        assert_eq!(manifest.len(), 2);
        assert!(matches!(manifest.get("hero"), Some(PreviewPayload::IndexedForm(_))));
    }

    #[test]
    fn indices_above_u8_fail() {
        let mut bundle = NamedBundle::new();
        bundle.insert("big", image(vec![vec![300]], 301));
        let store = InMemoryTreeStore::new();
        let err = PaletteExportStage::default()
            .run(StageInput::Indexed(&bundle), &store, &p("output"))
            .unwrap_err();
        assert!(matches!(err, StageError::Npy(_)));
    }

    #[test]
    fn tree_input_rejected() {
        let input = InMemoryTreeStore::new();
        let root = p("input");
        let err = PaletteExportStage::default()
            .run(StageInput::Tree { store: &input, root: &root }, &InMemoryTreeStore::new(), &p("output"))
            .unwrap_err();
        assert!(matches!(err, StageError::UnsupportedInput(_)));
    }

    #[test]
    fn custom_reference_and_limit() {
        let stage = PaletteExportStage::new(
            PaletteExportConfig {
                reference_name: "Ref".into(),
                max_colors: 1,
            },
            "meta/previews.json",
        );
        let mut bundle = NamedBundle::new();
        bundle.insert("Ref", image(vec![vec![0, 1]], 2));
        bundle.insert("two", image(vec![vec![0, 1]], 2));
        let store = InMemoryTreeStore::new();
        let report = stage.run(StageInput::Indexed(&bundle), &store, &p("out")).unwrap();
        assert_eq!(report.skipped, vec!["two".to_string()]);
        assert!(store.exists(&p("out/Ref.pal")).unwrap());
        assert!(store.exists(&p("out/meta/previews.json")).unwrap());
    }
}
