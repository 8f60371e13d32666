pub mod group;
pub mod handler;
pub mod index;
pub mod length;
pub mod marker;

pub use group::{group_by_name, group_by_normalized_name, is_predominant, normalize_name};
pub use handler::{
    assemble_chapters, build_chapters_from_files, overload_track_chapters,
    overload_track_chapters_keep_unique, remove_duplicate_follow_ups, SourceFile,
};
pub use index::{chapters_numbered_consecutively, reindex, rename_chapters};
pub use length::{enforce_max_length, recalculate_groups, LengthOptions};
pub use marker::{guess_chapters_by_silences, guess_chapters_by_tracks};

use crate::time::TimeInterval;

/// A named interval in the audiobook timeline, the unit of output.
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    interval: TimeInterval,
    name: String,
    introduction: Option<String>,
}

impl Chapter {
    pub fn new(start_ms: i64, length_ms: i64, name: impl Into<String>) -> Self {
        Self {
            interval: TimeInterval::new(start_ms, length_ms),
            name: name.into(),
            introduction: None,
        }
    }

    pub fn from_bounds(start_ms: i64, end_ms: i64, name: impl Into<String>) -> Self {
        Self {
            interval: TimeInterval::from_bounds(start_ms, end_ms),
            name: name.into(),
            introduction: None,
        }
    }

    pub fn with_introduction(mut self, introduction: impl Into<String>) -> Self {
        self.introduction = Some(introduction.into());
        self
    }

    pub fn interval(&self) -> TimeInterval {
        self.interval
    }

    pub fn start(&self) -> i64 {
        self.interval.start()
    }

    pub fn end(&self) -> i64 {
        self.interval.end()
    }

    pub fn length(&self) -> i64 {
        self.interval.length()
    }

    pub fn set_start(&mut self, start_ms: i64) {
        self.interval.set_start(start_ms);
    }

    pub fn set_end(&mut self, end_ms: i64) {
        self.interval.set_end(end_ms);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Short descriptive excerpt, independent of the name.
    pub fn introduction(&self) -> Option<&str> {
        self.introduction.as_deref()
    }

    pub fn set_introduction(&mut self, introduction: Option<String>) {
        self.introduction = introduction;
    }

    pub fn overlap_ms(&self, other: &Chapter) -> i64 {
        self.interval.overlap_ms(&other.interval)
    }

    /// Shared duration as a fraction of this chapter's length.
    pub fn overlap_ratio(&self, other: &Chapter) -> f64 {
        if self.length() <= 0 {
            return 0.0;
        }
        self.overlap_ms(other) as f64 / self.length() as f64
    }
}

/// Index of the candidate with maximum temporal overlap against `target`,
/// or `None` when nothing overlaps at all. Ties favor the first-seen
/// candidate.
pub(crate) fn best_overlap_index(target: &Chapter, candidates: &[Chapter]) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        let overlap = target.overlap_ms(candidate);
        if overlap <= 0 {
            continue;
        }
        match best {
            Some((_, best_overlap)) if overlap <= best_overlap => {}
            _ => best = Some((i, overlap)),
        }
    }
    best.map(|(i, _)| i)
}

/// A contiguous run of chapters sharing a (normalized) name prefix.
#[derive(Debug, Clone, Default)]
pub struct ChapterGroup {
    /// Possibly empty: "no common name".
    pub name: String,
    pub chapters: Vec<Chapter>,
}

impl ChapterGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chapters: Vec::new(),
        }
    }

    pub fn start(&self) -> i64 {
        self.chapters.first().map(Chapter::start).unwrap_or(0)
    }

    pub fn end(&self) -> i64 {
        self.chapters.last().map(Chapter::end).unwrap_or(0)
    }

    /// Span from the first chapter's start to the last chapter's end.
    pub fn length(&self) -> i64 {
        self.end() - self.start()
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn average_chapter_length(&self) -> i64 {
        if self.chapters.is_empty() {
            return 0;
        }
        self.length() / self.chapters.len() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_accessors() {
        let mut chapter = Chapter::new(1000, 5000, "Chapter 1");
        assert_eq!(chapter.start(), 1000);
        assert_eq!(chapter.end(), 6000);
        assert_eq!(chapter.name(), "Chapter 1");
        assert!(chapter.introduction().is_none());

        chapter.set_end(8000);
        assert_eq!(chapter.length(), 7000);
        assert_eq!(chapter.start(), 1000);
    }

    #[test]
    fn test_chapter_introduction() {
        let chapter = Chapter::new(0, 1000, "Prologue").with_introduction("It was a dark night.");
        assert_eq!(chapter.introduction(), Some("It was a dark night."));
    }

    #[test]
    fn test_best_overlap_prefers_larger() {
        let track = Chapter::from_bounds(0, 50_000, "track");
        let overlays = vec![
            Chapter::from_bounds(0, 20_000, "first"),
            Chapter::from_bounds(20_000, 60_000, "second"),
        ];

        assert_eq!(best_overlap_index(&track, &overlays), Some(1));
    }

    #[test]
    fn test_best_overlap_tie_favors_first_seen() {
        let track = Chapter::from_bounds(0, 40_000, "track");
        let overlays = vec![
            Chapter::from_bounds(0, 20_000, "first"),
            Chapter::from_bounds(20_000, 40_000, "second"),
        ];

        assert_eq!(best_overlap_index(&track, &overlays), Some(0));
    }

    #[test]
    fn test_best_overlap_none_when_disjoint() {
        let track = Chapter::from_bounds(0, 10_000, "track");
        let overlays = vec![Chapter::from_bounds(20_000, 30_000, "far")];

        assert_eq!(best_overlap_index(&track, &overlays), None);
    }

    #[test]
    fn test_group_length_spans_members() {
        let mut group = ChapterGroup::new("Chapter");
        group.chapters.push(Chapter::from_bounds(1000, 2000, "Chapter 1"));
        group.chapters.push(Chapter::from_bounds(2000, 5000, "Chapter 2"));

        assert_eq!(group.start(), 1000);
        assert_eq!(group.end(), 5000);
        assert_eq!(group.length(), 4000);
        assert_eq!(group.average_chapter_length(), 2000);
    }

    #[test]
    fn test_empty_group() {
        let group = ChapterGroup::new("");
        assert_eq!(group.length(), 0);
        assert_eq!(group.average_chapter_length(), 0);
    }
}
