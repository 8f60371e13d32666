// JSON chapter export
use super::ChapterFormatter;
use crate::chapter::Chapter;
use crate::time::format_timestamp;
use serde::Serialize;

#[derive(Default)]
pub struct JsonFormatter {
    pub source_file: Option<String>,
    pub total_duration_ms: Option<i64>,
}

#[derive(Serialize)]
struct JsonOutput {
    metadata: JsonMetadata,
    chapters: Vec<JsonChapter>,
}

#[derive(Serialize)]
struct JsonMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    source_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_duration_ms: Option<i64>,
    chapter_count: usize,
}

#[derive(Serialize)]
struct JsonChapter {
    index: usize,
    start_ms: i64,
    end_ms: i64,
    start_formatted: String,
    end_formatted: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    introduction: Option<String>,
}

impl ChapterFormatter for JsonFormatter {
    fn format(&self, chapters: &[Chapter]) -> String {
        let output = JsonOutput {
            metadata: JsonMetadata {
                source_file: self.source_file.clone(),
                total_duration_ms: self.total_duration_ms,
                chapter_count: chapters.len(),
            },
            chapters: chapters
                .iter()
                .enumerate()
                .map(|(i, c)| JsonChapter {
                    index: i + 1,
                    start_ms: c.start(),
                    end_ms: c.end(),
                    start_formatted: format_timestamp(c.start()),
                    end_formatted: format_timestamp(c.end()),
                    name: c.name().to_string(),
                    introduction: c.introduction().map(str::to_string),
                })
                .collect(),
        };

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}
