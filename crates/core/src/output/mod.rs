//! Output formatting module
//!
//! This module renders a [`HeaderReport`] as plain text, ANSI colored text,
//! JSON, or YAML.

pub mod ansi;
mod json;
mod yaml;

pub use ansi::format_ansi;
pub use json::format_json;
pub use yaml::format_yaml;

use crate::models::{HeaderReport, HeaderSummary};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Line placed between consecutive sections when delimiters are enabled
pub const SECTION_DELIMITER: &str = "---";

/// Output format errors
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Unknown output format: {0}")]
    UnknownFormat(String),
}

/// Available output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Section headers followed by declarations
    #[default]
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// ANSI colored text
    Ansi,
}

impl FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "ansi" => Ok(OutputFormat::Ansi),
            other => Err(FormatError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Ansi => "ansi",
        };
        f.write_str(name)
    }
}

impl HeaderReport {
    /// Render the report in the given format
    pub fn render(&self, format: OutputFormat, delimiters: bool) -> Result<String, FormatError> {
        format_report(self, format, delimiters)
    }
}

/// Format a report in the specified format
///
/// `delimiters` only affects the text layouts.
pub fn format_report(
    report: &HeaderReport,
    format: OutputFormat,
    delimiters: bool,
) -> Result<String, FormatError> {
    match format {
        OutputFormat::Text => Ok(format_text(&report.summary, delimiters)),
        OutputFormat::Ansi => Ok(format_ansi(&report.summary, delimiters)),
        OutputFormat::Json => format_json(report),
        OutputFormat::Yaml => format_yaml(report),
    }
}

/// Plain text layout
///
/// Every section is `<Title>:`, an empty line, one line per declaration and
/// another empty line. Sections are joined with newlines.
pub fn format_text(summary: &HeaderSummary, delimiters: bool) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (index, (section, items)) in summary.sections().enumerate() {
        if delimiters && index > 0 {
            lines.push(SECTION_DELIMITER.to_string());
        }
        lines.push(section.title_line());
        lines.push(String::new());
        lines.extend(items.iter().cloned());
        lines.push(String::new());
    }

    lines.join("\n")
}
