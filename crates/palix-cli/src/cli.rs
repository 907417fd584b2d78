use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use palix_archive::ContainerFormat;
use palix_pipeline::PipelineMode;

#[derive(Parser)]
#[command(
    name = "palix",
    about = "palix: palette-indexed image bundles in, transformed archives out",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run images through a transformation stage and bundle the result
    Run(RunArgs),
    /// Pack a directory into an archive
    Pack(PackArgs),
    /// Unpack an archive into a directory
    Unpack(UnpackArgs),
    /// List archive entries
    List(ListArgs),
    /// Encode an image as indexed JSON
    Encode(EncodeArgs),
    /// Decode indexed JSON back to a PNG
    Decode(DecodeArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ModeArg {
    Indexed,
    Tree,
}

impl From<ModeArg> for PipelineMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Indexed => PipelineMode::Indexed,
            ModeArg::Tree => PipelineMode::Tree,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum FormatArg {
    Native,
    TarZst,
}

impl From<FormatArg> for ContainerFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Native => ContainerFormat::Native,
            FormatArg::TarZst => ContainerFormat::TarZst,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum StageArg {
    PaletteExport,
    Mirror,
}

impl StageArg {
    pub fn stage_name(self) -> &'static str {
        match self {
            Self::PaletteExport => "palette-export",
            Self::Mirror => "mirror",
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    /// Image files, directories or archives
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// Output archive
    #[arg(short, long)]
    pub output: PathBuf,
    #[arg(long)]
    pub mode: Option<ModeArg>,
    #[arg(long, default_value = "palette-export")]
    pub stage: StageArg,
    /// Container format; defaults to the output extension, then the config
    #[arg(long)]
    pub format: Option<FormatArg>,
    /// Write rendered previews as PNGs into this directory
    #[arg(long)]
    pub previews: Option<PathBuf>,
    /// Pipeline configuration (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct PackArgs {
    pub dir: PathBuf,
    /// Output archive; defaults to `<dir>.<format extension>` beside `dir`
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub format: Option<FormatArg>,
}

#[derive(Args)]
pub struct UnpackArgs {
    pub archive: PathBuf,
    /// Target directory, created if missing
    #[arg(short = 'd', long = "dir")]
    pub dir: PathBuf,
}

#[derive(Args)]
pub struct ListArgs {
    pub archive: PathBuf,
}

#[derive(Args)]
pub struct EncodeArgs {
    pub image: PathBuf,
    /// Output JSON; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct DecodeArgs {
    pub json: PathBuf,
    #[arg(short, long)]
    pub output: PathBuf,
}
