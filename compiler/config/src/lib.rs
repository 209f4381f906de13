#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Wiregen Configuration
//!
//! This crate provides configuration management for wiregen.
//! It handles loading and saving configuration files that specify:
//! - Default generator options (documentation and helper file emission)
//! - Logging configuration
//!
//! Configuration is stored in TOML format and can be loaded from files or
//! created with sensible defaults. Command line flags always override the
//! configured defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    /// Failed to parse the TOML configuration file
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize configuration to TOML format
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Could not locate the user's configuration directory
    #[error("Could not find user config directory")]
    ConfigDirUnavailable,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Generator defaults
    pub generator: GeneratorConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Generator defaults, overridable from the command line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Skip the doxygen hook after generation
    #[serde(default)]
    pub no_doxygen: bool,
    /// Skip the Markdown documentation output
    #[serde(default)]
    pub no_markdown: bool,
    /// Skip installing the helper runtime files
    #[serde(default)]
    pub no_helper_files: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Log file path (optional)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { level: "info".to_string(), file: None } }
}

impl Config {
    /// Load configuration from a TOML file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save this configuration as a pretty-printed TOML file at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns the default config file path:
    /// `{config_dir()}/wiregen/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir =
            dirs::config_dir().ok_or(ConfigError::ConfigDirUnavailable)?.join("wiregen");
        Ok(config_dir.join("config.toml"))
    }

    /// Load the configuration from the default path, falling back to the
    /// built-in defaults when no file exists there.
    pub fn load_default() -> Self {
        match Self::default_path() {
            Ok(path) if path.exists() => Self::from_file(&path).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_from_file() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        let toml_content = r#"
            [generator]
            no_doxygen = true
            no_markdown = false
            no_helper_files = true

            [logging]
            level = "debug"
            file = "debug.log"
        "#;
        fs::write(&temp_file, toml_content)
            .expect("Failed to write TOML content to temporary file");

        let loaded = Config::from_file(&temp_file).expect("Failed to load config");
        assert!(loaded.generator.no_doxygen);
        assert!(!loaded.generator.no_markdown);
        assert!(loaded.generator.no_helper_files);
        assert_eq!(loaded.logging.level, "debug");
        assert_eq!(loaded.logging.file, Some(PathBuf::from("debug.log")));

        // Missing sections fall back to defaults field by field
        let temp_file2 = NamedTempFile::new().expect("Failed to create second temporary file");
        fs::write(&temp_file2, "[generator]\nno_markdown = true\n[logging]\nlevel = \"warn\"\n")
            .expect("Failed to write second TOML content");
        let loaded2 = Config::from_file(&temp_file2).expect("Failed to load second config");
        assert!(loaded2.generator.no_markdown);
        assert!(!loaded2.generator.no_doxygen);
        assert_eq!(loaded2.logging.level, "warn");

        // File not found error
        let result = Config::from_file("nonexistent_file.toml");
        match result.expect_err("Expected error for nonexistent file") {
            ConfigError::FileRead(_) => {}
            other => panic!("Expected FileRead error, got {:?}", other),
        }

        // Parse error
        let temp_file3 =
            NamedTempFile::new().expect("Failed to create temporary file for parse error test");
        fs::write(&temp_file3, "invalid toml content").expect("Failed to write invalid TOML");
        match Config::from_file(&temp_file3).expect_err("Expected parse error for invalid TOML") {
            ConfigError::Parse(_) => {}
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_save() {
        let mut config = Config::default();
        config.generator.no_doxygen = true;
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");

        config.save(&temp_file).expect("Failed to save config");

        let restored = Config::from_file(&temp_file).expect("Failed to read saved config");
        assert!(restored.generator.no_doxygen);
        assert_eq!(restored.logging.level, "info");
    }

    #[test]
    fn test_default_path() {
        let path = Config::default_path().expect("Failed to get default config path");
        let path_str = path.to_str().expect("Path should be valid UTF-8");
        assert!(path_str.contains("wiregen"));
        assert!(path_str.ends_with("config.toml"));
    }
}
