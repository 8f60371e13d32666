use crate::error::{ChapterizeError, Result};
use crate::time::parse_timestamp;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Ffmetadata,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Txt => write!(f, "txt"),
            OutputFormat::Ffmetadata => write!(f, "ffmetadata"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" => Ok(OutputFormat::Txt),
            "ffmetadata" => Ok(OutputFormat::Ffmetadata),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Unknown format: {}. Use 'txt', 'ffmetadata', or 'json'",
                s
            )),
        }
    }
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Ffmetadata => "ffmetadata",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub default_format: OutputFormat,
    /// Soft target chapter length in milliseconds; 0 leaves it unset.
    pub desired_length_ms: i64,
    /// Hard upper bound in milliseconds; 0 disables length enforcement.
    pub max_length_ms: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::default(),
            desired_length_ms: 0,
            max_length_ms: 0,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Ok(file_config) = toml::from_str::<Config>(&contents) {
                    config = file_config;
                }
            }
        }

        // Override with environment variables
        if let Ok(format) = std::env::var("CHAPTERIZE_DEFAULT_FORMAT") {
            if let Ok(f) = format.parse() {
                config.default_format = f;
            }
        }
        if let Ok(length) = std::env::var("CHAPTERIZE_DESIRED_LENGTH") {
            if let Some(ms) = parse_timestamp(&length) {
                config.desired_length_ms = ms;
            }
        }
        if let Ok(length) = std::env::var("CHAPTERIZE_MAX_LENGTH") {
            if let Some(ms) = parse_timestamp(&length) {
                config.max_length_ms = ms;
            }
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.desired_length_ms < 0 || self.max_length_ms < 0 {
            return Err(ChapterizeError::Config(
                "Chapter lengths must not be negative".to_string(),
            ));
        }

        if self.max_length_ms > 0 && self.desired_length_ms > self.max_length_ms {
            return Err(ChapterizeError::Config(format!(
                "Desired length ({} ms) exceeds maximum length ({} ms)",
                self.desired_length_ms, self.max_length_ms
            )));
        }

        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("chapterize").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Txt);
        assert_eq!(
            "ffmetadata".parse::<OutputFormat>().unwrap(),
            OutputFormat::Ffmetadata
        );
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_extension() {
        assert_eq!(OutputFormat::Txt.extension(), "txt");
        assert_eq!(OutputFormat::Ffmetadata.extension(), "ffmetadata");
        assert_eq!(OutputFormat::Json.extension(), "json");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_format, OutputFormat::Txt);
        assert_eq!(config.desired_length_ms, 0);
        assert_eq!(config.max_length_ms, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_desired_exceeding_max() {
        let config = Config {
            desired_length_ms: 400_000,
            max_length_ms: 300_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unset_max_allows_any_desired() {
        let config = Config {
            desired_length_ms: 400_000,
            max_length_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_negative_lengths() {
        let config = Config {
            desired_length_ms: -1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
