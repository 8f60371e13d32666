//! ffmetadata `[CHAPTER]` blocks, the tagging format handed to the muxer.
//!
//! Emitted with `TIMEBASE=1/1000`; parsing honors arbitrary `num/den`
//! timebases and converts raw start/end values to milliseconds.

use super::ChapterFormatter;
use crate::chapter::Chapter;

pub const FFMETADATA_HEADER: &str = ";FFMETADATA1";

pub struct FfmetadataFormatter;

impl ChapterFormatter for FfmetadataFormatter {
    fn format(&self, chapters: &[Chapter]) -> String {
        let mut output = String::from(FFMETADATA_HEADER);
        output.push('\n');

        for chapter in chapters {
            output.push_str("[CHAPTER]\n");
            output.push_str("TIMEBASE=1/1000\n");
            output.push_str(&format!("START={}\n", chapter.start()));
            output.push_str(&format!("END={}\n", chapter.end()));
            output.push_str(&format!("title={}\n", escape(chapter.name())));
        }

        output
    }

    fn extension(&self) -> &'static str {
        "ffmetadata"
    }
}

/// Backslash-escape the characters ffmetadata treats as special.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | '=' | ';' | '#' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn unescape(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                unescaped.push(next);
            }
        } else {
            unescaped.push(c);
        }
    }
    unescaped
}

#[derive(Default)]
struct ChapterBlock {
    timebase_num: i64,
    timebase_den: i64,
    start: Option<i64>,
    end: Option<i64>,
    title: String,
}

impl ChapterBlock {
    fn new() -> Self {
        Self {
            timebase_num: 1,
            timebase_den: 1000,
            ..Default::default()
        }
    }

    fn to_ms(&self, raw: i64) -> i64 {
        if self.timebase_den <= 0 {
            return raw;
        }
        (raw as i128 * self.timebase_num as i128 * 1000 / self.timebase_den as i128) as i64
    }

    fn into_chapter(self) -> Option<Chapter> {
        let start = self.to_ms(self.start?);
        let end = self.to_ms(self.end.unwrap_or(self.start?));
        Some(Chapter::from_bounds(start, end, self.title))
    }
}

/// Parse `[CHAPTER]` blocks out of an ffmetadata file.
///
/// Unknown sections, comments, and malformed key/value lines are skipped;
/// a block without a start is dropped.
pub fn parse_ffmetadata(text: &str) -> Vec<Chapter> {
    let mut chapters: Vec<Chapter> = Vec::new();
    let mut current: Option<ChapterBlock> = None;

    for line in text.lines() {
        if line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if line.trim() == "[CHAPTER]" {
            if let Some(block) = current.take() {
                chapters.extend(block.into_chapter());
            }
            current = Some(ChapterBlock::new());
            continue;
        }
        if line.trim_start().starts_with('[') {
            // Some other section (e.g. [STREAM]); chapter scope ends.
            if let Some(block) = current.take() {
                chapters.extend(block.into_chapter());
            }
            continue;
        }

        let Some(block) = current.as_mut() else {
            continue;
        };
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        match key {
            "TIMEBASE" => {
                if let Some((num, den)) = value.split_once('/') {
                    if let (Ok(num), Ok(den)) = (num.parse(), den.parse()) {
                        block.timebase_num = num;
                        block.timebase_den = den;
                    }
                }
            }
            "START" => block.start = value.parse().ok(),
            "END" => block.end = value.parse().ok(),
            "title" => block.title = unescape(value),
            _ => {}
        }
    }

    if let Some(block) = current.take() {
        chapters.extend(block.into_chapter());
    }

    chapters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_chapters() {
        let chapters = vec![
            Chapter::from_bounds(0, 90_000, "Intro"),
            Chapter::from_bounds(90_000, 300_000, "Chapter 1"),
        ];

        let output = FfmetadataFormatter.format(&chapters);

        assert!(output.starts_with(";FFMETADATA1\n"));
        assert!(output.contains("[CHAPTER]\nTIMEBASE=1/1000\nSTART=0\nEND=90000\ntitle=Intro\n"));
        assert!(output.contains("START=90000\nEND=300000\ntitle=Chapter 1\n"));
    }

    #[test]
    fn test_escape_special_characters() {
        let chapters = vec![Chapter::from_bounds(0, 1000, "A = B; #1")];
        let output = FfmetadataFormatter.format(&chapters);
        assert!(output.contains("title=A \\= B\\; \\#1\n"));
    }

    #[test]
    fn test_parse_round_trip() {
        let chapters = vec![
            Chapter::from_bounds(0, 90_000, "Intro"),
            Chapter::from_bounds(90_000, 300_000, "A = B; #1"),
        ];

        let parsed = parse_ffmetadata(&FfmetadataFormatter.format(&chapters));

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name(), "Intro");
        assert_eq!(parsed[1].name(), "A = B; #1");
        assert_eq!(parsed[1].start(), 90_000);
        assert_eq!(parsed[1].end(), 300_000);
    }

    #[test]
    fn test_parse_converts_timebase() {
        let text = "\
;FFMETADATA1
[CHAPTER]
TIMEBASE=1/1000000000
START=90000000000
END=300000000000
title=Nanoseconds
";
        let parsed = parse_ffmetadata(text);

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].start(), 90_000);
        assert_eq!(parsed[0].end(), 300_000);
    }

    #[test]
    fn test_parse_skips_malformed_blocks() {
        let text = "\
;FFMETADATA1
[CHAPTER]
TIMEBASE=not/a/timebase
no equals sign here
title=Broken start
[CHAPTER]
TIMEBASE=1/1000
START=0
END=1000
title=Good
";
        let parsed = parse_ffmetadata(text);

        // The first block has no START and is dropped.
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name(), "Good");
    }
}
