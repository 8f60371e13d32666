pub mod chapter;
pub mod config;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod silence;
pub mod time;

pub use chapter::{Chapter, ChapterGroup, LengthOptions};
pub use config::{Config, OutputFormat};
pub use error::{ChapterizeError, Result};
pub use pipeline::{
    print_summary, process_chapters, PipelineConfig, PipelineResult, PipelineStats,
};
pub use silence::{CachedSilences, Silence, SilenceSource};
pub use time::TimeInterval;
