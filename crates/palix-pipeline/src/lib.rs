//! Pipeline orchestration for palix.
//!
//! A [`Pipeline`] takes uploaded entries, turns recognized images into a
//! [`NamedBundle`] of indexed images (or unpacks the upload as a tree),
//! hands that to an injected [`TransformStage`], and packs whatever the
//! stage wrote into an archive. If the stage leaves a preview manifest,
//! its entries are rendered too.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use palix_archive::ArchiveEntry;
//! use palix_pipeline::{Pipeline, PipelineConfig, PaletteExportStage};
//!
//! let pipeline = Pipeline::new(
//!     PipelineConfig::default(),
//!     Box::new(PaletteExportStage::default()),
//! )
//! .unwrap();
//! let upload = vec![ArchiveEntry::file("Base.png", std::fs::read("Base.png").unwrap())];
//! let output = pipeline.run(&upload).unwrap();
//! std::fs::write("out.plxa", &output.archive).unwrap();
//! ```

pub mod bundle;
pub mod config;
pub mod error;
pub mod extract;
pub mod input;
pub mod naming;
pub mod npy;
pub mod orchestrator;
pub mod preview;
pub mod stage;
pub mod stages;

pub use bundle::NamedBundle;
pub use config::{PaletteExportConfig, PipelineConfig, PipelineMode};
pub use error::{PipelineError, PipelineResult, StageError};
pub use extract::{decode_raster, extract_bundle, index_raster};
pub use input::collect_inputs;
pub use naming::{is_recognized_image, sanitize_name};
pub use orchestrator::{Pipeline, PipelineOutput};
pub use preview::{render_manifest, render_preview, PreviewManifest, PreviewPayload, RenderedPreview};
pub use stage::{StageInput, StageReport, TransformStage};
pub use stages::{builtin_stage, MirrorStage, PaletteExportStage, BUILTIN_STAGES};
