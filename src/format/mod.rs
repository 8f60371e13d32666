pub mod ffmetadata;
pub mod json;
pub mod txt;

use crate::chapter::Chapter;
use crate::config::OutputFormat;

pub trait ChapterFormatter {
    fn format(&self, chapters: &[Chapter]) -> String;
    fn extension(&self) -> &'static str;
}

pub fn create_formatter(format: OutputFormat) -> Box<dyn ChapterFormatter> {
    match format {
        OutputFormat::Txt => Box::new(txt::TxtFormatter),
        OutputFormat::Ffmetadata => Box::new(ffmetadata::FfmetadataFormatter),
        OutputFormat::Json => Box::new(json::JsonFormatter::default()),
    }
}
