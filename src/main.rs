use anyhow::{Context, Result};
use chapterize::chapter::LengthOptions;
use chapterize::config::{Config, OutputFormat};
use chapterize::pipeline::{print_summary, process_chapters, PipelineConfig};
use chapterize::time::parse_timestamp;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "chapterize")]
#[command(version, about = "Chapter segmentation and alignment for long-form audio")]
#[command(
    long_about = "Reconcile audiobook chapter timelines: split oversized chapters at detected silences, normalize names and numbering, and align catalog chapter lists."
)]
struct Cli {
    /// Input chapter file (text listing or ffmetadata)
    input: PathBuf,

    /// Output chapter file (defaults to input name with appropriate extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: txt, ffmetadata, json
    #[arg(short, long)]
    format: Option<String>,

    /// Silence-detector log to cut and snap at
    #[arg(short, long)]
    silence: Option<PathBuf>,

    /// Independently segmented chapter file to take names from
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Keep unique track titles when overlaying
    #[arg(long)]
    keep_unique: bool,

    /// Re-align the overlay against detected silences instead of matching
    /// by overlap
    #[arg(long)]
    align: bool,

    /// Desired chapter length (e.g. 4:30:00 or 300)
    #[arg(long)]
    desired_length: Option<String>,

    /// Maximum chapter length; enables splitting
    #[arg(long)]
    max_length: Option<String>,

    /// Skip the renaming heuristics
    #[arg(long)]
    no_rename: bool,

    /// Collapse adjacent chapters with identical names
    #[arg(long)]
    merge_similar: bool,

    /// Suppress the summary and progress output
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn derive_output_path(input: &Path, format: &OutputFormat) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let mut output = input.to_path_buf();
    output.set_file_name(format!(
        "{}.chapters.{}",
        stem.to_string_lossy(),
        format.extension()
    ));
    output
}

fn parse_length(value: &str, flag: &str) -> Result<i64> {
    parse_timestamp(value)
        .with_context(|| format!("Invalid duration for {}: {}", flag, value))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Validate input file exists
    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }

    // Load configuration, then apply command-line overrides
    let mut config = Config::load().context("Failed to load configuration")?;

    if let Some(ref format) = cli.format {
        config.default_format = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    }
    if let Some(ref length) = cli.desired_length {
        config.desired_length_ms = parse_length(length, "--desired-length")?;
    }
    if let Some(ref length) = cli.max_length {
        config.max_length_ms = parse_length(length, "--max-length")?;
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    let format = config.default_format;
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| derive_output_path(&cli.input, &format));

    info!("Input:    {}", cli.input.display());
    info!("Output:   {}", output.display());
    info!("Format:   {}", format);
    if let Some(ref silence) = cli.silence {
        info!("Silences: {}", silence.display());
    }
    if let Some(ref overlay) = cli.overlay {
        info!("Overlay:  {}", overlay.display());
    }

    let pipeline_config = PipelineConfig {
        format,
        lengths: LengthOptions::new(config.desired_length_ms, config.max_length_ms),
        rename: !cli.no_rename,
        merge_similar: cli.merge_similar,
        keep_unique: cli.keep_unique,
        align_by_silences: cli.align,
        show_progress: !cli.quiet,
    };

    let result = process_chapters(
        &cli.input,
        &output,
        cli.silence.as_deref(),
        cli.overlay.as_deref(),
        pipeline_config,
    )?;

    if !cli.quiet {
        print_summary(&result);
    }

    Ok(())
}
