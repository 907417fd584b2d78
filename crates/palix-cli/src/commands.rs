use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;
use palix_archive::{pack, read_archive, unpack, write_archive, ArchiveReader, ContainerFormat};
use palix_codec::{decode, IndexedImage};
use palix_pipeline::{builtin_stage, collect_inputs, index_raster, Pipeline, PipelineConfig, RenderedPreview};
use palix_store::{FsTreeStore, StorePath};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run(args) => cmd_run(args),
        Command::Pack(args) => cmd_pack(args),
        Command::Unpack(args) => cmd_unpack(args),
        Command::List(args) => cmd_list(args),
        Command::Encode(args) => cmd_encode(args),
        Command::Decode(args) => cmd_decode(args),
    }
}

/// Explicit flag first, then the output extension, then `fallback`.
fn pick_format(flag: Option<FormatArg>, output: &Path, fallback: ContainerFormat) -> ContainerFormat {
    flag.map(ContainerFormat::from)
        .or_else(|| ContainerFormat::from_file_name(&output.to_string_lossy()))
        .unwrap_or(fallback)
}

/// `<dir>.<extension>` next to `dir`.
fn default_archive_path(dir: &Path, format: ContainerFormat) -> anyhow::Result<PathBuf> {
    let dir = dir
        .canonicalize()
        .with_context(|| format!("cannot resolve {}", dir.display()))?;
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no name to derive an archive name from", dir.display()))?;
    Ok(dir.with_file_name(format!("{name}.{}", format.extension())))
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    config.container = pick_format(args.format, &args.output, config.container);

    let stage_name = args.stage.stage_name();
    let stage = builtin_stage(stage_name, &config)
        .with_context(|| format!("unknown stage {stage_name}"))?;
    let pipeline = Pipeline::new(config, stage)?;

    let inputs = collect_inputs(&args.inputs)?;
    let output = pipeline.run(&inputs)?;
    std::fs::write(&args.output, &output.archive)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!(
        "{} {} {} inputs through {}",
        "✓".green().bold(),
        "Processed".bold(),
        output.inputs_processed,
        pipeline.stage_name().cyan()
    );
    println!(
        "  Archive: {} ({} entries, {} bytes, {})",
        args.output.display().to_string().bold(),
        output.entries.len(),
        output.archive.len(),
        output.format
    );
    for name in &output.stage_report.skipped {
        println!("  {} skipped {}", "!".yellow().bold(), name.yellow());
    }

    if let Some(dir) = &args.previews {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        for (name, preview) in &output.previews {
            let path = dir.join(format!("{name}.png"));
            std::fs::write(&path, preview.to_png()?)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("  Preview: {}", path.display().to_string().blue());
        }
    }
    println!("  Elapsed: {:?}", output.elapsed);
    Ok(())
}

fn cmd_pack(args: PackArgs) -> anyhow::Result<()> {
    let store = FsTreeStore::open(&args.dir)
        .with_context(|| format!("cannot open {}", args.dir.display()))?;
    let entries = pack(&store, &StorePath::root())?;
    let (output, format) = match args.output {
        Some(output) => {
            let format = pick_format(args.format, &output, ContainerFormat::Native);
            (output, format)
        }
        None => {
            let format = args.format.map(ContainerFormat::from).unwrap_or_default();
            (default_archive_path(&args.dir, format)?, format)
        }
    };
    let size = write_archive(&output, format, &entries)?;
    println!(
        "{} Packed {} entries into {} ({} bytes, {})",
        "✓".green().bold(),
        entries.len(),
        output.display().to_string().bold(),
        size,
        format
    );
    Ok(())
}

fn cmd_unpack(args: UnpackArgs) -> anyhow::Result<()> {
    let entries = read_archive(&args.archive)?;
    let store = FsTreeStore::create(&args.dir)
        .with_context(|| format!("cannot create {}", args.dir.display()))?;
    let report = unpack(&entries, &store, &StorePath::root())?;
    println!(
        "{} Unpacked {} files into {} ({} directories created)",
        "✓".green().bold(),
        report.files_written,
        args.dir.display().to_string().bold(),
        report.directories_created
    );
    if report.entries_skipped > 0 {
        println!("  {} {} entries with empty paths skipped", "!".yellow(), report.entries_skipped);
    }
    Ok(())
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let format = ContainerFormat::from_path(&args.archive)?;
    let entries = read_archive(&args.archive)?;
    println!("{} ({}, {} entries)", args.archive.display().to_string().bold(), format, entries.len());
    if format == ContainerFormat::Native {
        let reader = ArchiveReader::open(&args.archive)?;
        println!("  Checksum: {}", hex::encode(reader.checksum()).dimmed());
    }
    for entry in &entries {
        if entry.is_directory {
            println!("  {:>10}  {}/", "-".dimmed(), entry.path.blue());
        } else {
            println!("  {:>10}  {}", entry.data.len(), entry.path);
        }
    }
    Ok(())
}

fn cmd_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("failed to read {}", args.image.display()))?;
    let image = index_raster(&args.image.display().to_string(), &bytes)?;
    let json = serde_json::to_string(&image)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "{} Encoded {}x{} image with {} colors into {}",
                "✓".green().bold(),
                image.width,
                image.height,
                image.color_count(),
                path.display().to_string().bold()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_decode(args: DecodeArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.json)
        .with_context(|| format!("failed to read {}", args.json.display()))?;
    let image: IndexedImage = serde_json::from_str(&text)
        .with_context(|| format!("{} is not an indexed image", args.json.display()))?;
    let pixels = decode(&image)?;
    let png = RenderedPreview::Pixels(pixels).to_png()?;
    std::fs::write(&args.output, png)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!(
        "{} Decoded {}x{} image into {}",
        "✓".green().bold(),
        image.width,
        image.height,
        args.output.display().to_string().bold()
    );
    Ok(())
}
