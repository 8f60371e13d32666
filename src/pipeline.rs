use crate::chapter::{
    guess_chapters_by_silences, marker::DEFAULT_MAX_DRIFT_MS, overload_track_chapters,
    overload_track_chapters_keep_unique, recalculate_groups, remove_duplicate_follow_ups,
    rename_chapters, Chapter, LengthOptions,
};
use crate::config::OutputFormat;
use crate::error::{ChapterizeError, Result};
use crate::format::create_formatter;
use crate::format::ffmetadata::{parse_ffmetadata, FFMETADATA_HEADER};
use crate::format::txt::parse_chapter_listing;
use crate::silence::parse_silence_log;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Configuration for one chapter-processing run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Output format.
    pub format: OutputFormat,
    /// Desired/maximum chapter lengths; a zero maximum disables splitting.
    pub lengths: LengthOptions,
    /// Apply the numbered-vs-named renaming heuristics.
    pub rename: bool,
    /// Collapse adjacent chapters with identical names.
    pub merge_similar: bool,
    /// Keep unique track titles when overlaying catalog names.
    pub keep_unique: bool,
    /// Re-align overlay chapters against detected silences instead of
    /// matching by overlap.
    pub align_by_silences: bool,
    /// Show progress spinners.
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            lengths: LengthOptions::default(),
            rename: true,
            merge_similar: false,
            keep_unique: false,
            align_by_silences: false,
            show_progress: true,
        }
    }
}

/// Statistics from one processing run.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Total time taken.
    pub total_time: Duration,
    /// Chapters read from the input.
    pub chapters_in: usize,
    /// Chapters written to the output.
    pub chapters_out: usize,
    /// Silences parsed from the detector log.
    pub silences: usize,
    /// End of the final chapter.
    pub total_duration_ms: i64,
    /// Output format used.
    pub format: String,
}

/// Result of one processing run.
#[derive(Debug)]
pub struct PipelineResult {
    /// Path to the written chapter file.
    pub output_path: PathBuf,
    /// The finalized chapter sequence.
    pub chapters: Vec<Chapter>,
    /// Run statistics.
    pub stats: PipelineStats,
}

/// Process a chapter file end to end.
///
/// 1. Parse the input chapter list (text listing or ffmetadata)
/// 2. Parse the silence-detector log, when given
/// 3. Enforce chapter length bounds, cutting at silences
/// 4. Rename chapters by the numbering heuristics
/// 5. Overlay or re-align an independently segmented chapter list
/// 6. Format and write the output file
pub fn process_chapters(
    input: &Path,
    output: &Path,
    silence_log: Option<&Path>,
    overlay: Option<&Path>,
    config: PipelineConfig,
) -> Result<PipelineResult> {
    let start_time = Instant::now();

    let multi_progress = if config.show_progress {
        Some(MultiProgress::new())
    } else {
        None
    };

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 1: Inputs
    // ═══════════════════════════════════════════════════════════════════════
    info!("Stage 1/4: Reading {:?}", input);
    let spinner = stage_spinner(&multi_progress, "Reading chapters...");

    let mut chapters = read_chapters(input)?;
    let chapters_in = chapters.len();

    let (mut silences, detected_duration) = match silence_log {
        Some(path) => {
            let scan = parse_silence_log(&fs::read_to_string(path)?);
            (scan.silences, scan.total_duration_ms)
        }
        None => (Vec::new(), None),
    };

    if let Some(pb) = spinner {
        pb.finish_with_message(format!(
            "✓ Read {} chapters, {} silences",
            chapters_in,
            silences.len()
        ));
    }
    info!(
        "Read {} chapters and {} silences",
        chapters_in,
        silences.len()
    );

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 2: Length enforcement
    // ═══════════════════════════════════════════════════════════════════════
    if config.lengths.enabled() {
        info!("Stage 2/4: Enforcing chapter length bounds");
        let spinner = stage_spinner(&multi_progress, "Splitting oversized chapters...");

        chapters.sort_by_key(Chapter::start);
        chapters = recalculate_groups(chapters, &silences, &config.lengths);

        if let Some(pb) = spinner {
            pb.finish_with_message(format!("✓ {} chapters after splitting", chapters.len()));
        }
    } else {
        info!("Stage 2/4: Length enforcement disabled");
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 3: Naming
    // ═══════════════════════════════════════════════════════════════════════
    info!("Stage 3/4: Normalizing chapter names");
    let spinner = stage_spinner(&multi_progress, "Renaming chapters...");

    if config.merge_similar {
        chapters = remove_duplicate_follow_ups(chapters);
    }
    if config.rename {
        chapters = rename_chapters(chapters);
    }

    if let Some(overlay_path) = overlay {
        let reference = read_chapters(overlay_path)?;
        chapters = if config.align_by_silences {
            let total = detected_duration
                .or_else(|| chapters.last().map(Chapter::end))
                .unwrap_or(0);
            guess_chapters_by_silences(&reference, &mut silences, total, DEFAULT_MAX_DRIFT_MS)
        } else if config.keep_unique {
            overload_track_chapters_keep_unique(chapters, &reference)
        } else {
            overload_track_chapters(chapters, &reference)
        };
    }

    if let Some(pb) = spinner {
        pb.finish_with_message(format!("✓ {} chapters named", chapters.len()));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 4: Output
    // ═══════════════════════════════════════════════════════════════════════
    info!("Stage 4/4: Writing {} output", config.format);
    let spinner = stage_spinner(&multi_progress, "Writing chapters...");

    let formatter = create_formatter(config.format);
    fs::write(output, formatter.format(&chapters))?;

    if let Some(pb) = spinner {
        pb.finish_with_message(format!("✓ Wrote {:?}", output));
    }
    info!("Wrote {} chapters to {:?}", chapters.len(), output);

    let total_duration_ms = chapters.last().map(Chapter::end).unwrap_or(0);
    let stats = PipelineStats {
        total_time: start_time.elapsed(),
        chapters_in,
        chapters_out: chapters.len(),
        silences: silences.len(),
        total_duration_ms,
        format: config.format.to_string(),
    };

    Ok(PipelineResult {
        output_path: output.to_path_buf(),
        chapters,
        stats,
    })
}

/// Read a chapter file, auto-detecting ffmetadata against the plain
/// text listing. An unparsable file yields an empty list, not an error.
fn read_chapters(path: &Path) -> Result<Vec<Chapter>> {
    if !path.exists() {
        return Err(ChapterizeError::FileNotFound(path.display().to_string()));
    }

    let contents = fs::read_to_string(path)?;
    let chapters = if contents.trim_start().starts_with(FFMETADATA_HEADER) {
        parse_ffmetadata(&contents)
    } else {
        parse_chapter_listing(&contents)
    };

    if chapters.is_empty() {
        warn!("No chapters found in {:?}", path);
    }

    Ok(chapters)
}

fn stage_spinner(multi_progress: &Option<MultiProgress>, message: &str) -> Option<ProgressBar> {
    multi_progress.as_ref().map(|mp| {
        let pb = mp.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    })
}

/// Print a summary of the processing results.
pub fn print_summary(result: &PipelineResult) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                    Chapter Processing Complete                 ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Output:     {}", result.output_path.display());
    println!("  Format:     {}", result.stats.format);
    println!(
        "  Chapters:   {} in, {} out",
        result.stats.chapters_in, result.stats.chapters_out
    );
    println!("  Silences:   {}", result.stats.silences);
    println!(
        "  Duration:   {}",
        crate::time::format_timestamp(result.stats.total_duration_ms)
    );
    println!(
        "  Total:      {:.2}s",
        result.stats.total_time.as_secs_f64()
    );
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}
