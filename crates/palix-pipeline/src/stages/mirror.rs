use palix_store::{NodeKind, StorePath, TreeStore};

use crate::error::StageError;
use crate::stage::{StageInput, StageReport, TransformStage};

/// Identity stage.
///
/// A tree input is copied leaf for leaf into the output root. A bundle is
/// written as one pretty-printed `<name>.indexed.json` per image. Bundle
/// keys never contain `.`, so an image named `preview.png` cannot shadow
/// the default `preview.json` manifest.
#[derive(Debug, Default)]
pub struct MirrorStage;

impl TransformStage for MirrorStage {
    fn name(&self) -> &str {
        "mirror"
    }

    fn run(
        &self,
        input: StageInput<'_>,
        output: &dyn TreeStore,
        output_root: &StorePath,
    ) -> Result<StageReport, StageError> {
        output.create_dir_all(output_root)?;
        let mut report = StageReport::default();
        match input {
            StageInput::Indexed(bundle) => {
                for (name, image) in bundle.iter() {
                    let path = output_root.join(&format!("{name}.indexed.json"))?;
                    output.write_file(&path, &serde_json::to_vec_pretty(image)?)?;
                    report.wrote();
                }
            }
            StageInput::Tree { store, root } => {
                if store.node_kind(root)? != Some(NodeKind::Directory) {
                    return Err(StageError::UnsupportedInput(format!("{root} is not a directory")));
                }
                copy_tree(store, root, output, output_root, &mut report)?;
            }
        }
        Ok(report)
    }
}

fn copy_tree(
    source: &dyn TreeStore,
    from: &StorePath,
    target: &dyn TreeStore,
    to: &StorePath,
    report: &mut StageReport,
) -> Result<(), StageError> {
    for child in source.list_dir(from)? {
        let src = from.join(&child.name)?;
        let dst = to.join(&child.name)?;
        match child.kind {
            NodeKind::Directory => {
                target.create_dir(&dst)?;
                copy_tree(source, &src, target, &dst, report)?;
            }
            NodeKind::File => {
                let data = source
                    .read_file(&src)?
                    .ok_or_else(|| StageError::Other(format!("{src} vanished while copying")))?;
                target.write_file(&dst, &data)?;
                report.wrote();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use palix_codec::{IndexedImage, Rgb};
    use palix_store::InMemoryTreeStore;

    use super::*;
    use crate::bundle::NamedBundle;

    fn p(s: &str) -> StorePath {
        StorePath::parse(s).unwrap()
    }

    #[test]
    fn copies_tree() {
        let input = InMemoryTreeStore::new();
        input.write_file_all(&p("input/a.txt"), b"a").unwrap();
        input.write_file_all(&p("input/sub/b.bin"), &[1, 2]).unwrap();
        input.create_dir_all(&p("input/empty")).unwrap();

        let output = InMemoryTreeStore::new();
        let root = p("input");
        let report = MirrorStage
            .run(StageInput::Tree { store: &input, root: &root }, &output, &p("output"))
            .unwrap();

        assert_eq!(report.files_written, 2);
        assert_eq!(output.read_file(&p("output/sub/b.bin")).unwrap().unwrap(), vec![1, 2]);
        assert_eq!(output.node_kind(&p("output/empty")).unwrap(), Some(NodeKind::Directory));
    }

    #[test]
    fn missing_tree_root_is_rejected() {
        let input = InMemoryTreeStore::new();
        let root = p("input");
        let err = MirrorStage
            .run(StageInput::Tree { store: &input, root: &root }, &InMemoryTreeStore::new(), &p("o"))
            .unwrap_err();
        assert!(matches!(err, StageError::UnsupportedInput(_)));
    }

    #[test]
    fn writes_bundle_as_json() {
        let image = IndexedImage {
            width: 1,
            height: 1,
            pixels: vec![vec![0]],
            palette: vec![Rgb::new(1, 2, 3)],
        };
        let mut bundle = NamedBundle::new();
        bundle.insert("hero", image.clone());

        let output = InMemoryTreeStore::new();
        MirrorStage
            .run(StageInput::Indexed(&bundle), &output, &p("output"))
            .unwrap();
        let bytes = output.read_file(&p("output/hero.indexed.json")).unwrap().unwrap();
        let back: IndexedImage = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, image);
    }
}
