//! Header summary engine
//!
//! This module ties the pieces together: it validates the input, parses the
//! header, applies the strict-mode check and runs the extractor over the tree.

use crate::config::{ConfigError, ExtractConfig};
use crate::extractor::extract;
use crate::models::{HeaderReport, Severity, SummaryMetadata};
use crate::parsers::{create_parser, HeaderParser, ParserError};
use std::fs;
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Parser error: {0}")]
    ParserError(#[from] ParserError),

    #[error("Header has {count} syntax error(s)")]
    Strict { count: usize },
}

/// Summarizes headers with a single reusable parser
pub struct HeaderSummarizer {
    config: ExtractConfig,
    parser: Box<dyn HeaderParser>,
}

impl HeaderSummarizer {
    /// Create a summarizer with the given configuration
    pub fn new(config: ExtractConfig) -> Result<Self, EngineError> {
        let parser = create_parser()?;
        Ok(Self { config, parser })
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Summarize the configured header
    pub fn summarize(&mut self) -> Result<HeaderReport, EngineError> {
        self.config.validate()?;

        let bytes = fs::read(&self.config.header).map_err(ConfigError::from)?;
        let source = String::from_utf8_lossy(&bytes);
        let header = self.config.header.clone();

        self.summarize_source(&source, &header)
    }

    /// Summarize header text as if it had been read from `path`
    pub fn summarize_source(
        &mut self,
        source: &str,
        path: &Path,
    ) -> Result<HeaderReport, EngineError> {
        let start = Instant::now();

        let unit = self.parser.parse(source, path)?;
        let errors = unit
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();

        if errors > 0 {
            tracing::warn!(header = %path.display(), errors, "header has syntax errors");
            if self.config.strict {
                return Err(EngineError::Strict { count: errors });
            }
        }

        let summary = extract(&unit.root, path);

        tracing::debug!(
            header = %path.display(),
            declarations = summary.total(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "summarized header"
        );

        Ok(HeaderReport {
            header: path.to_path_buf(),
            summary,
            diagnostics: unit.diagnostics,
            metadata: SummaryMetadata::now(),
        })
    }
}

/// Summarize the header named by `config`
pub fn summarize_header(config: &ExtractConfig) -> Result<HeaderReport, EngineError> {
    HeaderSummarizer::new(config.clone())?.summarize()
}
