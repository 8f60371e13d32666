//! Aligning an independently segmented "reference" chapter list (e.g. from
//! a catalog) against detected silences or a track timeline.

use tracing::debug;

use super::handler::overload_track_chapters;
use super::Chapter;
use crate::silence::Silence;

/// Largest accepted change of the running offset between two consecutive
/// reference chapters; larger jumps are treated as bad matches.
pub const DEFAULT_MAX_DRIFT_MS: i64 = 25_000;

/// Snap each reference chapter boundary to the nearest detected silence.
///
/// A chapter starting at zero stays fixed. For every other chapter the
/// silence minimizing `|chapter_start - running_offset - silence_start|`
/// is considered; the match is accepted when the implied offset change
/// stays below `max_drift_ms`, and the boundary snaps to the silence
/// midpoint. Rejected matches keep the offset-corrected original position.
/// Accepted silences are flagged as chapter starts. Chapter lengths derive
/// from the gap to the next mark; the final chapter runs to
/// `total_duration_ms`.
pub fn guess_chapters_by_silences(
    reference: &[Chapter],
    silences: &mut [Silence],
    total_duration_ms: i64,
    max_drift_ms: i64,
) -> Vec<Chapter> {
    let mut marks: Vec<(i64, &Chapter)> = Vec::with_capacity(reference.len());
    let mut offset = 0i64;

    for chapter in reference {
        if chapter.start() == 0 {
            marks.push((0, chapter));
            continue;
        }

        let target = chapter.start() - offset;
        let best = silences
            .iter_mut()
            .min_by_key(|s| (target - s.start()).abs());

        let mark = match best {
            Some(silence) => {
                let snapped = silence.midpoint();
                let implied_offset = chapter.start() - snapped;
                if (implied_offset - offset).abs() < max_drift_ms {
                    silence.mark_chapter_start();
                    offset = implied_offset;
                    snapped
                } else {
                    debug!(
                        "Silence at {} ms drifts too far from '{}', keeping position",
                        silence.start(),
                        chapter.name()
                    );
                    chapter.start() - offset
                }
            }
            None => chapter.start() - offset,
        };

        marks.push((mark, chapter));
    }

    marks.sort_by_key(|(mark, _)| *mark);

    let mut result: Vec<Chapter> = Vec::with_capacity(marks.len());
    for (i, (mark, original)) in marks.iter().enumerate() {
        let end = match marks.get(i + 1) {
            Some((next_mark, _)) => *next_mark,
            None => total_duration_ms.max(*mark),
        };
        let mut chapter = Chapter::from_bounds(*mark, end, original.name());
        chapter.set_introduction(original.introduction().map(str::to_string));
        result.push(chapter);
    }

    result
}

/// Assign names from a reference list onto an independently segmented
/// track list by maximum temporal overlap.
pub fn guess_chapters_by_tracks(reference: &[Chapter], tracks: Vec<Chapter>) -> Vec<Chapter> {
    overload_track_chapters(tracks, reference)
}
