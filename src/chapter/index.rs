//! Renaming heuristics: numbered-vs-named detection, renumbering, and
//! template-driven reindexing of chapter groups.

use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

use super::group::{group_by_normalized_name, is_predominant, normalize_name};
use super::Chapter;

/// Decide whether a chapter list is "numbered": names are mostly bare
/// increasing integers under a shared textual stem.
///
/// The most common normalized form must account for `max(total - 3, 1)`
/// chapters or 75% of the total, whichever is smaller. A separate
/// word-overlap pass (adjacent chapters with at least two words each
/// sharing at least one word) can cross the same threshold on its own.
pub fn chapters_numbered_consecutively(chapters: &[Chapter]) -> bool {
    let total = chapters.len();
    if total == 0 {
        return false;
    }

    let threshold = numbering_threshold(total);

    let mut counts: HashMap<String, usize> = HashMap::new();
    for chapter in chapters {
        *counts.entry(normalize_name(chapter.name())).or_default() += 1;
    }
    let max_frequency = counts.values().copied().max().unwrap_or(0);
    if max_frequency as f64 >= threshold {
        return true;
    }

    let mut overlapping_pairs = 0usize;
    for pair in chapters.windows(2) {
        if share_a_word(pair[0].name(), pair[1].name()) {
            overlapping_pairs += 1;
        }
    }

    overlapping_pairs as f64 >= threshold
}

fn numbering_threshold(total: usize) -> f64 {
    let by_count = total.saturating_sub(3).max(1) as f64;
    let by_ratio = total as f64 * 0.75;
    by_count.min(by_ratio)
}

fn share_a_word(a: &str, b: &str) -> bool {
    let words_a: Vec<String> = a.split_whitespace().map(str::to_lowercase).collect();
    let words_b: Vec<String> = b.split_whitespace().map(str::to_lowercase).collect();
    if words_a.len() < 2 || words_b.len() < 2 {
        return false;
    }
    words_a.iter().any(|w| words_b.contains(w))
}

/// Rename a flat chapter list according to the numbered-vs-named decision.
///
/// Numbered: chapters become their trailing numeric token, repeated tokens
/// get a `.`-suffixed sub-index (`3.1`, `3.2`), unnamed chapters continue
/// the sequence. Named: exact duplicates get a parenthesized sub-index,
/// unique names pass through unchanged.
pub fn rename_chapters(mut chapters: Vec<Chapter>) -> Vec<Chapter> {
    if chapters_numbered_consecutively(&chapters) {
        debug!("Chapter names look numbered, renumbering");
        rename_numbered(&mut chapters);
    } else {
        debug!("Chapter names look distinct, deduplicating");
        rename_named(&mut chapters);
    }
    chapters
}

fn rename_numbered(chapters: &mut [Chapter]) {
    let number_re = Regex::new(r"(\d+)\s*$").expect("Invalid regex");
    let tokens: Vec<Option<i64>> = chapters
        .iter()
        .map(|c| {
            number_re
                .captures(c.name())
                .and_then(|cap| cap[1].parse().ok())
        })
        .collect();

    let mut counts: HashMap<i64, usize> = HashMap::new();
    for token in tokens.iter().flatten() {
        *counts.entry(*token).or_default() += 1;
    }

    let mut sub_seen: HashMap<i64, usize> = HashMap::new();
    let mut last_number = 0i64;

    for (chapter, token) in chapters.iter_mut().zip(tokens) {
        match token {
            Some(number) if counts[&number] > 1 => {
                let sub = sub_seen.entry(number).or_default();
                *sub += 1;
                chapter.set_name(format!("{}.{}", number, sub));
                last_number = number;
            }
            Some(number) => {
                chapter.set_name(number.to_string());
                last_number = number;
            }
            None => {
                last_number += 1;
                chapter.set_name(last_number.to_string());
            }
        }
    }
}

fn rename_named(chapters: &mut [Chapter]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for chapter in chapters.iter() {
        *counts.entry(chapter.name().to_string()).or_default() += 1;
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    for chapter in chapters.iter_mut() {
        if counts[chapter.name()] > 1 {
            let sub = seen.entry(chapter.name().to_string()).or_default();
            *sub += 1;
            let renamed = format!("{} ({})", chapter.name(), sub);
            chapter.set_name(renamed);
        }
    }
}

/// Template-driven renaming of name groups.
///
/// Groups that are unnamed or predominant get their shared boilerplate
/// suffix stripped, are re-split along the original file boundaries
/// (`track_starts`), and are renamed by one of four positional templates.
/// `presplit_starts` are the chapter start positions before length
/// splitting; a start not found there marks the group as internally split.
/// Non-predominant named groups with more than one member just get a
/// positional suffix.
pub fn reindex(chapters: Vec<Chapter>, track_starts: &[i64], presplit_starts: &[i64]) -> Vec<Chapter> {
    let groups = group_by_normalized_name(&chapters);
    if groups.is_empty() {
        return chapters;
    }

    let total_groups = groups.len();
    let named_groups = groups.iter().filter(|g| !g.name.is_empty()).count();
    let predominant: Vec<bool> = groups.iter().map(|g| is_predominant(g, &groups)).collect();

    let mut result: Vec<Chapter> = Vec::with_capacity(chapters.len());

    for (group, predominant) in groups.into_iter().zip(predominant) {
        if group.name.is_empty() || predominant {
            let mut members = group.chapters;
            strip_common_suffix(&mut members);

            let was_split = !presplit_starts.is_empty()
                && members.iter().any(|c| !presplit_starts.contains(&c.start()));

            if total_groups == 1 {
                let count = members.len();
                for (i, member) in members.iter_mut().enumerate() {
                    member.set_name(format!("{}/{}", i + 1, count));
                }
            } else if named_groups > 1 {
                // Multiple independent name estimates exist; the stripped
                // member names stand on their own.
            } else {
                apply_track_group_template(&mut members, track_starts, was_split);
            }

            result.extend(members);
        } else if group.len() > 1 {
            let count = group.len();
            for (i, mut member) in group.chapters.into_iter().enumerate() {
                let renamed = format!("{} ({}/{})", member.name(), i + 1, count);
                member.set_name(renamed);
                result.push(member);
            }
        } else {
            result.extend(group.chapters);
        }
    }

    result
}

/// Rename members as `{groupIndex}/{trackGroupCount}` along track
/// boundaries, suffixing `({chapterIndex}/{chapterCount})` inside track
/// groups that were split into several chapters.
fn apply_track_group_template(members: &mut [Chapter], track_starts: &[i64], was_split: bool) {
    let track_groups = split_by_tracks(members, track_starts);
    let track_group_count = track_groups.len();

    for (group_index, member_indexes) in track_groups.iter().enumerate() {
        let chapter_count = member_indexes.len();
        for (chapter_index, member_index) in member_indexes.iter().enumerate() {
            let mut name = format!("{}/{}", group_index + 1, track_group_count);
            if was_split && chapter_count > 1 {
                name.push_str(&format!(" ({}/{})", chapter_index + 1, chapter_count));
            }
            members[*member_index].set_name(name);
        }
    }
}

/// Partition member indexes into runs that fall inside the same original
/// file, where `track_starts` are the (sorted) file start positions. With
/// no boundaries everything lands in one run.
fn split_by_tracks(members: &[Chapter], track_starts: &[i64]) -> Vec<Vec<usize>> {
    let mut runs: Vec<Vec<usize>> = Vec::new();
    let mut current_track: Option<usize> = None;

    for (i, member) in members.iter().enumerate() {
        let track = track_starts
            .iter()
            .take_while(|start| **start <= member.start())
            .count();

        if current_track == Some(track) {
            runs.last_mut().expect("run exists for current track").push(i);
        } else {
            runs.push(vec![i]);
            current_track = Some(track);
        }
    }

    runs
}

/// Remove the name suffix shared by every member, character by character
/// from the end, then trim what remains. Single-member groups are left
/// alone (their whole name would count as the suffix).
fn strip_common_suffix(chapters: &mut [Chapter]) {
    if chapters.len() < 2 {
        return;
    }

    let names: Vec<Vec<char>> = chapters.iter().map(|c| c.name().chars().collect()).collect();
    let min_len = names.iter().map(Vec::len).min().unwrap_or(0);

    let mut suffix_len = 0;
    while suffix_len < min_len {
        let reference = names[0][names[0].len() - 1 - suffix_len];
        if names
            .iter()
            .all(|n| n[n.len() - 1 - suffix_len] == reference)
        {
            suffix_len += 1;
        } else {
            break;
        }
    }

    if suffix_len == 0 {
        return;
    }

    for (chapter, name) in chapters.iter_mut().zip(names) {
        let stripped: String = name[..name.len() - suffix_len].iter().collect();
        chapter.set_name(stripped.trim_end());
    }
}
