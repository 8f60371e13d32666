use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChapterizeError {
    #[error("Missing duration for source file: {0}")]
    MissingDuration(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChapterizeError>;
