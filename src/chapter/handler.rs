//! Building a chapter timeline from an ordered list of source files and
//! reconciling it with independently named chapter lists.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::group::normalize_name;
use super::index::reindex;
use super::length::{recalculate_groups, LengthOptions};
use super::{best_overlap_index, Chapter};
use crate::error::{ChapterizeError, Result};
use crate::silence::Silence;

/// Name of the synthetic leading track marker.
pub const INTRO_CHAPTER_NAME: &str = "Intro";
/// Name of the synthetic trailing track marker.
pub const OUTRO_CHAPTER_NAME: &str = "Outro";

/// Metadata for one ordered source file, as returned by the external
/// per-file metadata reader.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    /// Filename-derived title (the stem).
    pub name: String,
    /// Exact duration; a missing duration fails the whole build, since
    /// every downstream offset would be meaningless.
    pub duration_ms: Option<i64>,
    /// Title read from the file's tags, preferred over the filename.
    pub tag_title: Option<String>,
    /// Chapter list embedded in the file, relative to the file start.
    pub embedded_chapters: Vec<Chapter>,
    /// Designated silence-between marker file.
    pub silence_marker: bool,
}

/// Walk an ordered file list and assemble the initial chapter timeline.
///
/// Each file becomes one chapter spanning its exact duration (named from
/// its tag title or filename), or contributes its embedded chapter list
/// shifted onto the running timeline. A silence-marker file never becomes
/// a chapter: half its duration extends the previous chapter, the next
/// chapter absorbs the rest.
pub fn build_chapters_from_files(files: &[SourceFile]) -> Result<Vec<Chapter>> {
    let mut chapters: Vec<Chapter> = Vec::new();
    let mut position = 0i64;

    for file in files {
        let duration = file
            .duration_ms
            .ok_or_else(|| ChapterizeError::MissingDuration(file.name.clone()))?;

        if file.silence_marker {
            if let Some(previous) = chapters.last_mut() {
                previous.set_end(previous.end() + duration / 2);
            }
            position += duration;
            continue;
        }

        let timeline_end = chapters.last().map(Chapter::end).unwrap_or(position);

        if !file.embedded_chapters.is_empty() {
            // Additive offset: the gap between the running end and the
            // embedded list's first start.
            let offset = timeline_end - file.embedded_chapters[0].start();
            debug!(
                "Merging {} embedded chapters from '{}' at offset {} ms",
                file.embedded_chapters.len(),
                file.name,
                offset
            );
            for embedded in &file.embedded_chapters {
                let mut chapter = embedded.clone();
                chapter.set_start(embedded.start() + offset);
                chapters.push(chapter);
            }
        } else {
            let title = file
                .tag_title
                .clone()
                .unwrap_or_else(|| file.name.clone());
            chapters.push(Chapter::from_bounds(timeline_end, position + duration, title));
        }

        position += duration;
    }

    chapters.sort_by_key(Chapter::start);
    Ok(chapters)
}

/// Assemble the final timeline from source files: build, enforce length
/// bounds against the detected silences, and reindex group names along
/// the original file boundaries.
pub fn assemble_chapters(
    files: &[SourceFile],
    silences: &[Silence],
    opts: &LengthOptions,
) -> Result<Vec<Chapter>> {
    let chapters = build_chapters_from_files(files)?;
    let presplit_starts: Vec<i64> = chapters.iter().map(Chapter::start).collect();

    let mut track_starts: Vec<i64> = Vec::new();
    let mut position = 0i64;
    for file in files {
        if !file.silence_marker {
            track_starts.push(position);
        }
        // Durations were validated by the build above.
        position += file.duration_ms.unwrap_or(0);
    }

    let chapters = recalculate_groups(chapters, silences, opts);
    Ok(reindex(chapters, &track_starts, &presplit_starts))
}

/// Collapse adjacent chapters with identical names into one, extending the
/// earlier chapter's end. A synthetic leading [`INTRO_CHAPTER_NAME`] or
/// trailing [`OUTRO_CHAPTER_NAME`] chapter is preserved rather than merged
/// away.
pub fn remove_duplicate_follow_ups(chapters: Vec<Chapter>) -> Vec<Chapter> {
    if chapters.is_empty() {
        return chapters;
    }

    let last_index = chapters.len() - 1;
    let mut result: Vec<Chapter> = Vec::with_capacity(chapters.len());

    for (i, chapter) in chapters.into_iter().enumerate() {
        let merge = match result.last() {
            Some(previous) if previous.name() == chapter.name() => {
                let leading_intro =
                    result.len() == 1 && previous.name() == INTRO_CHAPTER_NAME;
                let trailing_outro = i == last_index && chapter.name() == OUTRO_CHAPTER_NAME;
                !(leading_intro || trailing_outro)
            }
            _ => false,
        };

        if merge {
            let previous = result.last_mut().expect("merge implies a previous chapter");
            previous.set_end(chapter.end());
        } else {
            result.push(chapter);
        }
    }

    result
}

/// Assign to each track chapter the name of the overlay chapter with the
/// maximum overlap ratio (`overlap_ms / track_length_ms`). Ties favor the
/// first-seen overlay chapter; tracks nothing overlaps keep their name.
pub fn overload_track_chapters(mut tracks: Vec<Chapter>, overlay: &[Chapter]) -> Vec<Chapter> {
    for track in &mut tracks {
        match best_overlap_index(track, overlay) {
            Some(best) => {
                track.set_name(overlay[best].name());
                track.set_introduction(overlay[best].introduction().map(str::to_string));
            }
            None => warn!(
                "No overlay chapter overlaps track '{}' at {} ms",
                track.name(),
                track.start()
            ),
        }
    }
    tracks
}

/// Like [`overload_track_chapters`], but a track whose normalized name is
/// unique among all tracks keeps its name verbatim, so meaningful one-off
/// titles survive the overlay.
pub fn overload_track_chapters_keep_unique(
    tracks: Vec<Chapter>,
    overlay: &[Chapter],
) -> Vec<Chapter> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for track in &tracks {
        *counts.entry(normalize_name(track.name())).or_default() += 1;
    }

    let mut result: Vec<Chapter> = Vec::with_capacity(tracks.len());
    for mut track in tracks {
        let normalized = normalize_name(track.name());
        let unique = !normalized.is_empty() && counts[&normalized] == 1;

        if !unique {
            if let Some(best) = best_overlap_index(&track, overlay) {
                track.set_name(overlay[best].name());
                track.set_introduction(overlay[best].introduction().map(str::to_string));
            }
        }
        result.push(track);
    }
    result
}
