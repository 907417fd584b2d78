use std::time::{Duration, Instant};

use palix_archive::{pack, unpack, ArchiveEntry, ContainerFormat};
use palix_store::{InMemoryTreeStore, NodeKind, StorePath, TreeStore};
use tracing::{debug, info};

use crate::config::{PipelineConfig, PipelineMode};
use crate::error::{PipelineError, PipelineResult};
use crate::extract::extract_bundle;
use crate::preview::{render_manifest, PreviewManifest, RenderedPreview};
use crate::stage::{StageInput, StageReport, TransformStage};

// ---------------------------------------------------------------------------
// PipelineOutput
// ---------------------------------------------------------------------------

/// Everything a successful run produced.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Packed output tree, relative to the output root.
    pub entries: Vec<ArchiveEntry>,
    /// Serialized container.
    pub archive: Vec<u8>,
    /// Format `archive` is encoded in.
    pub format: ContainerFormat,
    /// Rendered previews in name order; empty without a manifest.
    pub previews: Vec<(String, RenderedPreview)>,
    /// What the stage reported.
    pub stage_report: StageReport,
    /// Images indexed (indexed mode) or entries unpacked (tree mode).
    pub inputs_processed: usize,
    /// Wall-clock time for the whole run.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// One upload-to-archive pass around an injected transformation stage.
///
/// A run is linear and never retried: extract or unpack the input, run the
/// stage into a fresh output tree, pack it, serialize the container, then
/// render previews if the stage left a manifest.
pub struct Pipeline {
    config: PipelineConfig,
    stage: Box<dyn TransformStage>,
}

impl Pipeline {
    /// Build a pipeline, validating the configuration.
    pub fn new(config: PipelineConfig, stage: Box<dyn TransformStage>) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self { config, stage })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Name of the injected stage.
    pub fn stage_name(&self) -> &str {
        self.stage.name()
    }

    /// Run the pipeline over uploaded entries.
    pub fn run(&self, input: &[ArchiveEntry]) -> PipelineResult<PipelineOutput> {
        let start = Instant::now();
        if input.is_empty() {
            return Err(PipelineError::InvalidInput("no input entries".into()));
        }
        info!(
            stage = self.stage.name(),
            mode = ?self.config.mode,
            entries = input.len(),
            "pipeline started"
        );

        let output_root = self.config.output_root_path()?;
        let output = InMemoryTreeStore::new();

        let (stage_report, inputs_processed) = match self.config.mode {
            PipelineMode::Indexed => {
                let bundle = extract_bundle(input, &self.config)?;
                info!(images = bundle.len(), "images indexed");
                let report = self.run_stage(StageInput::Indexed(&bundle), &output, &output_root)?;
                (report, bundle.len())
            }
            PipelineMode::Tree => {
                let input_root = self.config.input_root_path()?;
                let input_store = InMemoryTreeStore::new();
                input_store.create_dir_all(&input_root)?;
                let unpacked = unpack(input, &input_store, &input_root)?;
                debug!(files = unpacked.files_written, root = %input_root, "input unpacked");
                let tree = StageInput::Tree {
                    store: &input_store,
                    root: &input_root,
                };
                let report = self.run_stage(tree, &output, &output_root)?;
                (report, unpacked.files_written)
            }
        };

        let entries = pack(&output, &output_root)?;
        let archive = self.config.container.encode(&entries)?;
        info!(
            entries = entries.len(),
            bytes = archive.len(),
            format = %self.config.container,
            "output packed"
        );

        let previews = self.render_previews(&output)?;
        let elapsed = start.elapsed();
        info!(previews = previews.len(), elapsed_ms = elapsed.as_millis() as u64, "pipeline finished");

        Ok(PipelineOutput {
            entries,
            archive,
            format: self.config.container,
            previews,
            stage_report,
            inputs_processed,
            elapsed,
        })
    }

    fn run_stage(
        &self,
        input: StageInput<'_>,
        output: &dyn TreeStore,
        output_root: &StorePath,
    ) -> PipelineResult<StageReport> {
        let name = self.stage.name();
        let stage_start = Instant::now();
        let report = self
            .stage
            .run(input, output, output_root)
            .map_err(|e| PipelineError::stage(name, e.to_string()))?;

        if output.node_kind(output_root)? != Some(NodeKind::Directory) {
            return Err(PipelineError::stage(
                name,
                format!("no output directory at {output_root}"),
            ));
        }
        info!(
            stage = name,
            files = report.files_written,
            skipped = report.skipped.len(),
            elapsed_ms = stage_start.elapsed().as_millis() as u64,
            "stage finished"
        );
        Ok(report)
    }

    fn render_previews(&self, output: &dyn TreeStore) -> PipelineResult<Vec<(String, RenderedPreview)>> {
        let path = self.config.preview_manifest_path()?;
        if output.node_kind(&path)? != Some(NodeKind::File) {
            debug!(%path, "no preview manifest");
            return Ok(Vec::new());
        }
        let Some(bytes) = output.read_file(&path)? else {
            return Ok(Vec::new());
        };
        let manifest = PreviewManifest::from_json(&bytes)?;
        render_manifest(&manifest)
    }
}
