//! Configuration schema (convreport.toml)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default wrap limit for report prose
pub const DEFAULT_LINE_WIDTH: usize = 80;

/// Default hanging indent for numbered issue lines
pub const DEFAULT_ITEM_INDENT: usize = 3;

fn default_line_width() -> usize {
    DEFAULT_LINE_WIDTH
}

fn default_item_indent() -> usize {
    DEFAULT_ITEM_INDENT
}

/// Report layout and defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Wrap limit for prose and issue lines
    #[serde(default = "default_line_width")]
    pub line_width: usize,

    /// Indent for continuation lines of numbered issues
    #[serde(default = "default_item_indent")]
    pub item_indent: usize,

    /// Source is a textual dump; include the statement breakdown
    #[serde(default)]
    pub from_pg_dump: bool,

    /// Where to write the report (stdout if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
            item_indent: DEFAULT_ITEM_INDENT,
            from_pg_dump: false,
            output: None,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Report settings
    #[serde(default)]
    pub report: ReportConfig,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        // Relative output paths are relative to the config file
        if let (Some(output), Some(parent)) = (config.report.output.as_mut(), path.parent()) {
            if output.is_relative() {
                *output = parent.join(&*output);
            }
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config.report.line_width == 0 {
            return Err(ConfigError::ParseError(
                "report.line_width must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.report.line_width, 80);
        assert_eq!(config.report.item_indent, 3);
        assert!(!config.report.from_pg_dump);
        assert!(config.report.output.is_none());
    }

    #[test]
    fn partial_toml() {
        let config = Config::from_toml("[report]\nfrom_pg_dump = true\n").unwrap();
        assert!(config.report.from_pg_dump);
        assert_eq!(config.report.line_width, 80);
    }

    #[test]
    fn empty_toml() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn zero_width_rejected() {
        let err = Config::from_toml("[report]\nline_width = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn relative_output_resolved_against_config_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("convreport.toml");
        std::fs::write(&path, "[report]\noutput = \"out/report.txt\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.report.output, Some(dir.path().join("out/report.txt")));
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::path::Path::new("/nonexistent/convreport.toml");
        let err = Config::from_file(path).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("convreport.toml");
        let mut config = Config::default();
        config.report.line_width = 100;

        config.save_to_file(&path).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn config_toml_roundtrip() {
        let mut config = Config::default();
        config.report.item_indent = 4;
        let toml = toml::to_string(&config).unwrap();
        let parsed = Config::from_toml(&toml).unwrap();
        assert_eq!(config, parsed);
    }
}
