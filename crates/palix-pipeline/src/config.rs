use std::path::Path;

use palix_archive::ContainerFormat;
use palix_store::StorePath;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// What the transformation stage receives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineMode {
    /// Recognized images are decoded and indexed into a named bundle.
    #[default]
    Indexed,
    /// Uploaded entries are unpacked as-is into an input tree.
    Tree,
}

/// Configuration for a pipeline run.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// mode = "indexed"
/// container = "tar-zst"
///
/// [palette_export]
/// max_colors = 32
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub mode: PipelineMode,
    /// Suffix that marks an input entry as an image.
    pub image_extension: String,
    /// Whether the suffix match is case-sensitive.
    pub case_sensitive_extension: bool,
    /// Where tree-mode input is unpacked in the input store.
    pub input_root: String,
    /// Directory the stage writes into and the bundler packs.
    pub output_root: String,
    /// Leaf name of the preview manifest under the output root.
    pub preview_manifest: String,
    /// Decode and index images on the rayon pool.
    pub parallel: bool,
    /// Container used for the output archive.
    pub container: ContainerFormat,
    pub palette_export: PaletteExportConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: PipelineMode::Indexed,
            image_extension: ".png".into(),
            case_sensitive_extension: true,
            input_root: "input".into(),
            output_root: "output".into(),
            preview_manifest: "preview.json".into(),
            parallel: true,
            container: ContainerFormat::Native,
            palette_export: PaletteExportConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> PipelineResult<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| PipelineError::Config(format!("invalid pipeline config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn from_file(path: &Path) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> PipelineResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| PipelineError::Config(format!("failed to serialize config: {e}")))
    }

    /// Check the values that serde cannot.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.image_extension.is_empty() {
            return Err(PipelineError::Config("image_extension must not be empty".into()));
        }
        if self.output_root_path()?.is_root() {
            return Err(PipelineError::Config("output_root must not be the store root".into()));
        }
        self.input_root_path()?;
        self.preview_manifest_path()?;
        Ok(())
    }

    pub fn input_root_path(&self) -> PipelineResult<StorePath> {
        parse_root("input_root", &self.input_root)
    }

    pub fn output_root_path(&self) -> PipelineResult<StorePath> {
        parse_root("output_root", &self.output_root)
    }

    /// Full store path of the preview manifest.
    pub fn preview_manifest_path(&self) -> PipelineResult<StorePath> {
        let relative = parse_root("preview_manifest", &self.preview_manifest)?;
        if relative.is_root() {
            return Err(PipelineError::Config("preview_manifest must name a leaf".into()));
        }
        Ok(self.output_root_path()?.concat(&relative))
    }
}

fn parse_root(key: &str, value: &str) -> PipelineResult<StorePath> {
    StorePath::parse(value).map_err(|e| PipelineError::Config(format!("{key}: {e}")))
}

/// Settings for [`crate::stages::PaletteExportStage`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaletteExportConfig {
    /// Image whose palette and index set the others are mapped onto.
    pub reference_name: String,
    /// Images using more distinct indices than this are skipped.
    pub max_colors: usize,
}

impl Default for PaletteExportConfig {
    fn default() -> Self {
        Self {
            reference_name: "Base".into(),
            max_colors: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = PipelineConfig::default();
        assert_eq!(c.mode, PipelineMode::Indexed);
        assert_eq!(c.image_extension, ".png");
        assert!(c.case_sensitive_extension);
        assert_eq!(c.output_root, "output");
        assert_eq!(c.preview_manifest, "preview.json");
        assert!(c.parallel);
        assert_eq!(c.container, ContainerFormat::Native);
        assert_eq!(c.palette_export.reference_name, "Base");
        assert_eq!(c.palette_export.max_colors, 16);
        c.validate().unwrap();
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = PipelineConfig::from_toml_str(
            "container = \"tar-zst\"\nmode = \"tree\"\n\n[palette_export]\nmax_colors = 32\n",
        )
        .unwrap();
        assert_eq!(c.container, ContainerFormat::TarZst);
        assert_eq!(c.mode, PipelineMode::Tree);
        assert_eq!(c.palette_export.max_colors, 32);
        assert_eq!(c.palette_export.reference_name, "Base");
        assert_eq!(c.input_root, "input");
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = PipelineConfig::from_toml_str("colour_limit = 3").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
        let err = PipelineConfig::from_toml_str("[palette_export]\nbase = \"x\"").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn bad_roots_rejected() {
        assert!(PipelineConfig::from_toml_str("output_root = \"\"").is_err());
        assert!(PipelineConfig::from_toml_str("output_root = \"../up\"").is_err());
        assert!(PipelineConfig::from_toml_str("image_extension = \"\"").is_err());
        assert!(PipelineConfig::from_toml_str("preview_manifest = \"/\"").is_err());
    }

    #[test]
    fn manifest_path_is_under_output_root() {
        let c = PipelineConfig::default();
        assert_eq!(c.preview_manifest_path().unwrap().to_string(), "/output/preview.json");
    }

    #[test]
    fn toml_roundtrip_and_file_load() {
        let mut c = PipelineConfig::default();
        c.parallel = false;
        c.palette_export.reference_name = "Ref".into();
        let text = c.to_toml_string().unwrap();
        assert_eq!(PipelineConfig::from_toml_str(&text).unwrap(), c);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palix.toml");
        std::fs::write(&path, text).unwrap();
        assert_eq!(PipelineConfig::from_file(&path).unwrap(), c);
        assert!(PipelineConfig::from_file(&dir.path().join("missing.toml")).is_err());
    }
}
