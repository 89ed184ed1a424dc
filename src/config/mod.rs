//! Configuration management for threadline.
//!
//! Configuration is read from `~/.config/threadline/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod browser;
pub mod summary;

pub use browser::BrowserConfig;
pub use summary::SummarySettings;

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub summary: SummarySettings,
    pub browser: BrowserConfig,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, creating it with defaults if missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/threadline/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("threadline").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# threadline configuration

[summary]
# Provider label, only custom endpoints are supported
aiProvider = "custom"

# Chat-completions style endpoint and its bearer token.
# Summaries fail with a configuration error until both are set.
apiKey = ""
endpoint = ""

model = "gpt-3.5-turbo"

# short (256 tokens), medium (512) or long (1024)
summaryLength = "medium"

# chinese, japanese, korean, quora or english
language = "chinese"

# Summarize the main post as soon as a discussion page is opened
autoSummarize = false

[browser]
# Run browser in headless mode (no visible window)
headless = true

# Page load timeout in seconds
timeout_secs = 30

# Wait time after page load before the first snapshot (milliseconds)
wait_after_load_ms = 1000

# How often a live page is re-read for new comments (milliseconds)
refresh_interval_ms = 1000
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.summary, SummarySettings::default());
        assert!(config.browser.headless);
        assert_eq!(config.browser.timeout_secs, 30);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[summary]
language = "japanese"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.summary.language, "japanese");
        assert_eq!(config.summary.summary_length, "medium");
        assert_eq!(config.browser.refresh_interval_ms, 1000);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.summary.model, "gpt-3.5-turbo");
        assert!(!config.summary.auto_summarize);
    }

    #[test]
    fn test_load_from_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("threadline").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.summary.language, "chinese");

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.summary, config.summary);
    }

    #[test]
    fn test_load_from_reports_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[summary\nendpoint = 1").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
