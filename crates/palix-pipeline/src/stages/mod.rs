//! Built-in transformation stages.

pub mod mirror;
pub mod palette_export;

pub use mirror::MirrorStage;
pub use palette_export::PaletteExportStage;

use crate::config::PipelineConfig;
use crate::stage::TransformStage;

/// Names accepted by [`builtin_stage`].
pub const BUILTIN_STAGES: &[&str] = &["palette-export", "mirror"];

/// Build a built-in stage by name.
pub fn builtin_stage(name: &str, config: &PipelineConfig) -> Option<Box<dyn TransformStage>> {
    match name {
        "palette-export" => Some(Box::new(PaletteExportStage::new(
            config.palette_export.clone(),
            config.preview_manifest.clone(),
        ))),
        "mirror" => Some(Box::new(MirrorStage)),
        _ => None,
    }
}
