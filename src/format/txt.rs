// Plain-text chapter listing: one line per chapter,
// `HH:MM:SS.mmm<space><name>`, `#` lines and blank lines ignored.
use super::ChapterFormatter;
use crate::chapter::Chapter;
use crate::time::{format_timestamp, parse_timestamp};

/// Trailing comment carrying the end of the final chapter.
pub const TOTAL_LENGTH_PREFIX: &str = "# total-length ";

pub struct TxtFormatter;

impl ChapterFormatter for TxtFormatter {
    fn format(&self, chapters: &[Chapter]) -> String {
        let mut output = String::new();
        for chapter in chapters {
            output.push_str(&format!(
                "{} {}\n",
                format_timestamp(chapter.start()),
                chapter.name()
            ));
        }
        if let Some(last) = chapters.last() {
            output.push_str(&format!(
                "{}{}\n",
                TOTAL_LENGTH_PREFIX,
                format_timestamp(last.end())
            ));
        }
        output
    }

    fn extension(&self) -> &'static str {
        "txt"
    }
}

/// Parse a chapter text listing.
///
/// Chapter ends derive from the next chapter's start. The final chapter
/// ends at the trailing total-length comment when present, else it has
/// length zero. Malformed lines are skipped.
pub fn parse_chapter_listing(text: &str) -> Vec<Chapter> {
    let mut entries: Vec<(i64, String)> = Vec::new();
    let mut total_length: Option<i64> = None;

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix(TOTAL_LENGTH_PREFIX) {
            if let Some(ms) = parse_timestamp(rest) {
                total_length = Some(ms);
            }
            continue;
        }
        if line.trim_start().starts_with('#') {
            continue;
        }

        let (stamp, name) = match line.split_once(' ') {
            Some((stamp, name)) => (stamp, name),
            None => (line, ""),
        };
        match parse_timestamp(stamp) {
            Some(start) => entries.push((start, name.to_string())),
            None => continue,
        }
    }

    let mut chapters: Vec<Chapter> = Vec::with_capacity(entries.len());
    for i in 0..entries.len() {
        let (start, ref name) = entries[i];
        let end = match entries.get(i + 1) {
            Some((next_start, _)) => *next_start,
            None => total_length.unwrap_or(start),
        };
        chapters.push(Chapter::from_bounds(start, end.max(start), name.clone()));
    }

    chapters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_listing() {
        let chapters = vec![
            Chapter::from_bounds(0, 90_000, "Intro"),
            Chapter::from_bounds(90_000, 3_661_123, "Chapter 1"),
        ];

        let formatter = TxtFormatter;
        let output = formatter.format(&chapters);

        assert_eq!(
            output,
            "00:00:00.000 Intro\n00:01:30.000 Chapter 1\n# total-length 01:01:01.123\n"
        );
    }

    #[test]
    fn test_parse_listing() {
        let text = "\
# generated listing

00:00:00.000 Intro
00:01:30.000 Chapter 1
# total-length 01:01:01.123
";
        let chapters = parse_chapter_listing(text);

        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].name(), "Intro");
        assert_eq!(chapters[0].end(), 90_000);
        assert_eq!(chapters[1].start(), 90_000);
        assert_eq!(chapters[1].end(), 3_661_123);
    }

    #[test]
    fn test_parse_without_total_length() {
        let chapters = parse_chapter_listing("00:00:00.000 Only\n");
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].length(), 0);
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let text = "\
garbage line
00:00:00.000 Good
also not a timestamp here
00:01:00.000 Also good
";
        let chapters = parse_chapter_listing(text);
        assert_eq!(chapters.len(), 2);
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let original = "\
00:00:00.000 Intro
00:01:30.500 Chapter 1
00:20:00.250 Chapter 2
# total-length 00:45:00.000
";
        let chapters = parse_chapter_listing(original);
        let output = TxtFormatter.format(&chapters);
        assert_eq!(output, original);
    }

    #[test]
    fn test_empty_name_round_trip() {
        let original = "00:00:10.000 \n# total-length 00:00:20.000\n";
        let chapters = parse_chapter_listing(original);
        assert_eq!(chapters[0].name(), "");
        assert_eq!(TxtFormatter.format(&chapters), original);
    }
}
