//! Data models for header summaries
//!
//! This module defines the declaration kinds consumed by the extractor, the
//! five-section summary it produces, and the parse diagnostics reported
//! alongside it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Kinds of syntax nodes the extractor distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    Typedef,
    Function,
    Struct,
    Enum,
    EnumConstant,
    Field,
    Macro,
    /// Anything else (variables, unions, includes, ...)
    Other,
}

impl DeclKind {
    /// Get human-readable label for the kind
    pub fn label(&self) -> &'static str {
        match self {
            DeclKind::Typedef => "typedef",
            DeclKind::Function => "function",
            DeclKind::Struct => "struct",
            DeclKind::Enum => "enum",
            DeclKind::EnumConstant => "enum constant",
            DeclKind::Field => "field",
            DeclKind::Macro => "macro",
            DeclKind::Other => "other",
        }
    }
}

/// Output sections, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Typedefs,
    Functions,
    Structs,
    Enums,
    Macros,
}

impl Section {
    /// All sections in the fixed display order
    pub const ALL: [Section; 5] = [
        Section::Typedefs,
        Section::Functions,
        Section::Structs,
        Section::Enums,
        Section::Macros,
    ];

    /// Section header title
    pub fn title(&self) -> &'static str {
        match self {
            Section::Typedefs => "Typedefs",
            Section::Functions => "Functions",
            Section::Structs => "Structs",
            Section::Enums => "Enums",
            Section::Macros => "Macros",
        }
    }

    /// Section header line, e.g. `Typedefs:`
    pub fn title_line(&self) -> String {
        format!("{}:", self.title())
    }
}

/// Formatted declarations of one header, grouped by kind
///
/// Each sequence keeps source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderSummary {
    pub typedefs: Vec<String>,
    pub functions: Vec<String>,
    pub structs: Vec<String>,
    pub enums: Vec<String>,
    pub macros: Vec<String>,
}

impl HeaderSummary {
    /// Declarations for a single section
    pub fn section(&self, section: Section) -> &[String] {
        match section {
            Section::Typedefs => &self.typedefs,
            Section::Functions => &self.functions,
            Section::Structs => &self.structs,
            Section::Enums => &self.enums,
            Section::Macros => &self.macros,
        }
    }

    /// Iterate sections in display order
    pub fn sections(&self) -> impl Iterator<Item = (Section, &[String])> + '_ {
        Section::ALL.into_iter().map(move |s| (s, self.section(s)))
    }

    /// Total number of emitted declarations
    pub fn total(&self) -> usize {
        self.sections().map(|(_, items)| items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A problem reported by the parser while building the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,

    /// Line number (1-indexed)
    pub line: usize,

    /// Column number (1-indexed)
    pub column: usize,

    pub message: String,
}

/// Metadata about the extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMetadata {
    /// ISO timestamp of the run
    pub timestamp: String,

    /// Tool version
    pub tool_version: String,
}

impl SummaryMetadata {
    pub fn now() -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Complete result for one header, as serialized by the JSON/YAML formats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderReport {
    /// Path of the summarized header
    pub header: PathBuf,

    pub summary: HeaderSummary,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,

    pub metadata: SummaryMetadata,
}

impl HeaderReport {
    /// Count diagnostics of error severity
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_follow_display_order() {
        let summary = HeaderSummary {
            typedefs: vec!["typedef int a;".to_string()],
            macros: vec!["#define X 1".to_string()],
            ..Default::default()
        };

        let titles: Vec<&str> = summary.sections().map(|(s, _)| s.title()).collect();
        assert_eq!(titles, ["Typedefs", "Functions", "Structs", "Enums", "Macros"]);
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.section(Section::Macros), ["#define X 1"]);
        assert_eq!(Section::Structs.title_line(), "Structs:");
    }

    #[test]
    fn test_error_count_ignores_warnings() {
        let report = HeaderReport {
            header: PathBuf::from("a.h"),
            summary: HeaderSummary::default(),
            diagnostics: vec![
                Diagnostic {
                    severity: Severity::Warning,
                    line: 1,
                    column: 1,
                    message: "missing `;`".to_string(),
                },
                Diagnostic {
                    severity: Severity::Error,
                    line: 2,
                    column: 1,
                    message: "syntax error".to_string(),
                },
            ],
            metadata: SummaryMetadata::now(),
        };

        assert_eq!(report.error_count(), 1);
        assert!(report.summary.is_empty());
    }
}
