//! Length-constrained splitting and recalculation of chapter sequences.
//!
//! Cuts are preferred at detected silences near the midpoint between the
//! desired and maximum chapter length; hard cuts are the fallback when
//! silence data is sparse.

use tracing::debug;

use super::group::{group_by_normalized_name, is_predominant};
use super::{Chapter, ChapterGroup};
use crate::silence::Silence;

/// Trailing segments shorter than this fold into their predecessor.
pub const MIN_CHAPTER_LENGTH_MS: i64 = 60_000;

/// A predominant group must exceed this many chapters before a complete
/// recalculation of its boundaries is attempted.
pub const RECALCULATION_THRESHOLD_CHAPTER_COUNT: usize = 120;

/// Desired and maximum chapter lengths, in milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthOptions {
    /// Soft target; cuts are preferred near this offset from a chapter start.
    pub desired_ms: i64,
    /// Hard upper bound. Zero or negative disables all length enforcement.
    pub max_ms: i64,
}

impl LengthOptions {
    pub fn new(desired_ms: i64, max_ms: i64) -> Self {
        Self { desired_ms, max_ms }
    }

    pub fn enabled(&self) -> bool {
        self.max_ms > 0
    }

    /// Desired length clamped into `(0, max]`; a missing desired length
    /// falls back to the maximum (cut as late as allowed).
    fn effective_desired(&self) -> i64 {
        if self.desired_ms <= 0 {
            self.max_ms
        } else {
            self.desired_ms.min(self.max_ms)
        }
    }
}

/// Split every oversized chapter so that no output chapter exceeds
/// `opts.max_ms`, then fold a trailing sliver into its predecessor.
///
/// Compliant chapters pass through untouched, so the pass is idempotent.
pub fn enforce_max_length(
    chapters: Vec<Chapter>,
    silences: &[Silence],
    opts: &LengthOptions,
) -> Vec<Chapter> {
    if !opts.enabled() {
        return chapters;
    }

    let mut result: Vec<Chapter> = Vec::with_capacity(chapters.len());
    for chapter in chapters {
        if chapter.length() > opts.max_ms {
            result.extend(split_chapter(&chapter, silences, opts));
        } else {
            result.push(chapter);
        }
    }

    merge_trailing_sliver(&mut result, opts.max_ms);
    result
}

/// Split one oversized chapter at silences inside the `[desired, max]`
/// window, walking forward until the remainder fits.
fn split_chapter(chapter: &Chapter, silences: &[Silence], opts: &LengthOptions) -> Vec<Chapter> {
    let desired = opts.effective_desired();
    let max = opts.max_ms;
    let end = chapter.end();

    let mut parts: Vec<Chapter> = Vec::new();
    let mut cursor = chapter.start();

    while end - cursor > max {
        let min_cut = cursor + desired;
        let max_cut = (cursor + max).min(end);

        let cut = match silence_cut(silences, min_cut, max_cut) {
            Some(cut) => cut,
            // No qualifying silence: hard-cut at the desired length only
            // when the remainder would leave room for at least one more
            // full-sized chapter; otherwise run to the window end.
            None if end - cursor > desired * 2 => min_cut,
            None => max_cut,
        };

        parts.push(split_part(chapter, cursor, cut, parts.is_empty()));
        cursor = cut;
    }

    parts.push(split_part(chapter, cursor, end, parts.is_empty()));

    debug!(
        "Split chapter '{}' ({} ms) into {} parts",
        chapter.name(),
        chapter.length(),
        parts.len()
    );

    parts
}

/// First silence, in start order, whose end falls inside the window.
/// The cut lands at the silence midpoint, clamped into the window so every
/// emitted segment respects both bounds.
fn silence_cut(silences: &[Silence], min_cut: i64, max_cut: i64) -> Option<i64> {
    silences
        .iter()
        .find(|s| s.end() >= min_cut && s.end() <= max_cut)
        .map(|s| s.midpoint().clamp(min_cut, max_cut))
}

fn split_part(chapter: &Chapter, start: i64, end: i64, first: bool) -> Chapter {
    let mut part = Chapter::from_bounds(start, end, chapter.name());
    if first {
        part.set_introduction(chapter.introduction().map(str::to_string));
    }
    part
}

/// Fold a trailing segment shorter than [`MIN_CHAPTER_LENGTH_MS`] into its
/// predecessor when the merge stays within the maximum length.
fn merge_trailing_sliver(chapters: &mut Vec<Chapter>, max_ms: i64) {
    if chapters.len() < 2 {
        return;
    }

    let last = &chapters[chapters.len() - 1];
    let previous = &chapters[chapters.len() - 2];
    if last.length() < MIN_CHAPTER_LENGTH_MS && previous.length() + last.length() <= max_ms {
        let last = chapters.pop().expect("len checked above");
        let previous = chapters.last_mut().expect("len checked above");
        debug!(
            "Merging trailing sliver '{}' ({} ms) into '{}'",
            last.name(),
            last.length(),
            previous.name()
        );
        previous.set_end(last.end());
    }
}

/// Group-aware length enforcement.
///
/// Each contiguous normalized-name group is handled on its own: a
/// predominant group made of many short chapters is rebuilt from scratch,
/// everything else (standalone long chapters included) goes through the
/// plain splitting path. Zero-length groups pass through unchanged, and a
/// single-chapter group is never rebuilt, only split.
pub fn recalculate_groups(
    chapters: Vec<Chapter>,
    silences: &[Silence],
    opts: &LengthOptions,
) -> Vec<Chapter> {
    if !opts.enabled() || chapters.is_empty() {
        return chapters;
    }

    let groups = group_by_normalized_name(&chapters);
    let mut result: Vec<Chapter> = Vec::with_capacity(chapters.len());

    for group in &groups {
        if group.length() <= 0 {
            result.extend(group.chapters.iter().cloned());
        } else if group.len() > 1 && needs_full_recalculation(group, &groups, opts) {
            result.extend(recalculate_group(group, silences, opts));
        } else {
            result.extend(enforce_max_length(
                group.chapters.clone(),
                silences,
                opts,
            ));
        }
    }

    merge_trailing_sliver(&mut result, opts.max_ms);
    result
}

fn needs_full_recalculation(
    group: &ChapterGroup,
    groups: &[ChapterGroup],
    opts: &LengthOptions,
) -> bool {
    is_predominant(group, groups)
        && group.average_chapter_length() < opts.effective_desired()
        && group.len() > RECALCULATION_THRESHOLD_CHAPTER_COUNT
}

/// Discard the group's fine-grained boundaries and re-derive them by
/// greedily walking from the group start. Each step takes the first
/// original chapter boundary inside the `[desired, max]` window, falling
/// back to a silence, falling back to the window end (so no rebuilt
/// chapter exceeds the maximum even with sparse silences).
fn recalculate_group(
    group: &ChapterGroup,
    silences: &[Silence],
    opts: &LengthOptions,
) -> Vec<Chapter> {
    let desired = opts.effective_desired();
    let max = opts.max_ms;
    let start = group.start();
    let end = group.end();

    let mut cuts: Vec<i64> = Vec::new();
    let mut cursor = start;

    while end - cursor > max {
        let min_cut = cursor + desired;
        let max_cut = (cursor + max).min(end);

        let cut = group
            .chapters
            .iter()
            .map(Chapter::start)
            .find(|s| *s >= min_cut && *s <= max_cut)
            .or_else(|| silence_cut(silences, min_cut, max_cut))
            .unwrap_or(max_cut);

        cuts.push(cut);
        cursor = cut;
    }

    let mut rebuilt: Vec<Chapter> = Vec::with_capacity(cuts.len() + 1);
    let mut cursor = start;
    for cut in cuts {
        rebuilt.push(Chapter::from_bounds(cursor, cut, ""));
        cursor = cut;
    }
    rebuilt.push(Chapter::from_bounds(cursor, end, ""));

    // Original names carry over only on a 1:1 count match; otherwise the
    // rebuilt chapters stay unnamed for the reindex pass.
    if rebuilt.len() == group.len() {
        for (fresh, original) in rebuilt.iter_mut().zip(&group.chapters) {
            fresh.set_name(original.name());
            fresh.set_introduction(original.introduction().map(str::to_string));
        }
    }

    debug!(
        "Recalculated group '{}': {} chapters -> {}",
        group.name,
        group.len(),
        rebuilt.len()
    );

    rebuilt
}
