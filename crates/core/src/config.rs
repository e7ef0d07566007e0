//! Configuration module for header extraction
//!
//! This module provides the extraction settings and the input checks that run
//! before a header is handed to the parser.

use crate::output::OutputFormat;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Header file not found: {0}")]
    HeaderNotFound(PathBuf),

    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("File too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Configuration for summarizing one header
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Header to summarize
    pub header: PathBuf,

    /// Output format
    pub format: OutputFormat,

    /// Separate output sections with `---`
    pub section_delimiters: bool,

    /// Treat syntax errors as fatal
    pub strict: bool,

    /// Maximum file size to process (bytes)
    pub max_file_size: u64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            header: PathBuf::new(),
            format: OutputFormat::default(),
            section_delimiters: true,
            strict: false,
            max_file_size: 10 * 1024 * 1024, // 10 MB
        }
    }
}

impl ExtractConfig {
    /// Create new config for a header
    pub fn new(header: PathBuf) -> Self {
        Self {
            header,
            ..Default::default()
        }
    }

    /// Set output format (builder pattern)
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set section delimiters (builder pattern)
    pub fn with_section_delimiters(mut self, enabled: bool) -> Self {
        self.section_delimiters = enabled;
        self
    }

    /// Set strict mode (builder pattern)
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set max file size (builder pattern)
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Check that the header exists, is a file and is within the size limit
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.header.exists() {
            return Err(ConfigError::HeaderNotFound(self.header.clone()));
        }

        let metadata = fs::metadata(&self.header)?;
        if !metadata.is_file() {
            return Err(ConfigError::NotAFile(self.header.clone()));
        }

        if metadata.len() > self.max_file_size {
            return Err(ConfigError::FileTooLarge {
                size: metadata.len(),
                limit: self.max_file_size,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_builder() {
        let config = ExtractConfig::new(PathBuf::from("api.h"))
            .with_format(OutputFormat::Yaml)
            .with_section_delimiters(false)
            .with_strict(true)
            .with_max_file_size(1024);

        assert_eq!(config.header, PathBuf::from("api.h"));
        assert_eq!(config.format, OutputFormat::Yaml);
        assert!(!config.section_delimiters);
        assert!(config.strict);
        assert_eq!(config.max_file_size, 1024);
    }

    #[test]
    fn test_default_config() {
        let config = ExtractConfig::default();
        assert_eq!(config.format, OutputFormat::Text);
        assert!(config.section_delimiters);
        assert!(!config.strict);
    }

    #[test]
    fn test_validate() {
        let dir = TempDir::new().unwrap();
        let header = dir.path().join("api.h");
        fs::write(&header, "int f(void);\n").unwrap();

        assert!(ExtractConfig::new(header.clone()).validate().is_ok());

        let missing = ExtractConfig::new(dir.path().join("missing.h")).validate();
        assert!(matches!(missing, Err(ConfigError::HeaderNotFound(_))));

        let directory = ExtractConfig::new(dir.path().to_path_buf()).validate();
        assert!(matches!(directory, Err(ConfigError::NotAFile(_))));

        let too_large = ExtractConfig::new(header).with_max_file_size(4).validate();
        assert!(matches!(too_large, Err(ConfigError::FileTooLarge { .. })));
    }
}
