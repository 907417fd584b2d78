use palix_store::{StorePath, TreeStore};

use crate::bundle::NamedBundle;
use crate::error::StageError;

// ---------------------------------------------------------------------------
// StageInput
// ---------------------------------------------------------------------------

/// What a stage receives, depending on the pipeline mode.
#[derive(Clone, Copy)]
pub enum StageInput<'a> {
    /// Indexed images keyed by sanitized name.
    Indexed(&'a NamedBundle),
    /// The raw upload unpacked under `root`.
    Tree {
        store: &'a dyn TreeStore,
        root: &'a StorePath,
    },
}

impl StageInput<'_> {
    /// Short label for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Indexed(_) => "indexed",
            Self::Tree { .. } => "tree",
        }
    }
}

impl std::fmt::Debug for StageInput<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Indexed(bundle) => f.debug_tuple("Indexed").field(&bundle.len()).finish(),
            Self::Tree { root, .. } => f.debug_struct("Tree").field("root", root).finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// StageReport
// ---------------------------------------------------------------------------

/// What a stage did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StageReport {
    /// Leaves written into the output tree.
    pub files_written: usize,
    /// Inputs the stage chose not to process.
    pub skipped: Vec<String>,
}

impl StageReport {
    pub(crate) fn wrote(&mut self) {
        self.files_written += 1;
    }

    pub(crate) fn skip(&mut self, name: impl Into<String>) {
        self.skipped.push(name.into());
    }
}

// ---------------------------------------------------------------------------
// TransformStage trait
// ---------------------------------------------------------------------------

/// The transformation step between extraction and bundling.
///
/// A stage reads its input and writes results under `output_root` in
/// `output`. The pipeline treats the call as atomic: any error discards the
/// output and no archive is produced.
///
/// The trait is object-safe and `Send + Sync` so a stage can be injected as a
/// `Box<dyn TransformStage>`.
pub trait TransformStage: Send + Sync {
    /// Human-readable name of this stage (e.g., "palette-export").
    fn name(&self) -> &str;

    /// Transform the input, writing results under `output_root`.
    fn run(
        &self,
        input: StageInput<'_>,
        output: &dyn TreeStore,
        output_root: &StorePath,
    ) -> Result<StageReport, StageError>;
}
