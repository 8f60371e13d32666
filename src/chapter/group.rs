//! Contiguous grouping of chapters by name.

use super::{Chapter, ChapterGroup};

/// Duration share a single group must exceed to dominate the timeline.
pub const REINDEX_RATIO: f64 = 0.75;

/// Strip digits, dots, and spaces, leaving the textual stem of a name.
///
/// `"Chapter 12"` and `"Chapter 3"` normalize to the same stem.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_ascii_digit() && *c != '.' && *c != ' ')
        .collect()
}

/// Partition a chapter sequence into contiguous groups wherever the name
/// changes. Grouping never reorders chapters or introduces gaps.
pub fn group_by_name(chapters: &[Chapter]) -> Vec<ChapterGroup> {
    group_by_key(chapters, |c| c.name().to_string())
}

/// Like [`group_by_name`], but chapters whose names differ only in digits,
/// dots, and spaces land in the same group. The group carries the
/// normalized name.
pub fn group_by_normalized_name(chapters: &[Chapter]) -> Vec<ChapterGroup> {
    group_by_key(chapters, |c| normalize_name(c.name()))
}

fn group_by_key<F>(chapters: &[Chapter], key: F) -> Vec<ChapterGroup>
where
    F: Fn(&Chapter) -> String,
{
    let mut groups: Vec<ChapterGroup> = Vec::new();

    for chapter in chapters {
        let chapter_key = key(chapter);
        match groups.last_mut() {
            Some(group) if group.name == chapter_key => {
                group.chapters.push(chapter.clone());
            }
            _ => {
                let mut group = ChapterGroup::new(chapter_key);
                group.chapters.push(chapter.clone());
                groups.push(group);
            }
        }
    }

    groups
}

/// Whether one group's duration exceeds [`REINDEX_RATIO`] of the combined
/// duration of all sibling groups.
pub fn is_predominant(group: &ChapterGroup, groups: &[ChapterGroup]) -> bool {
    let total: i64 = groups.iter().map(ChapterGroup::length).sum();
    if total <= 0 {
        return false;
    }
    group.length() as f64 / total as f64 > REINDEX_RATIO
}
