//! mta_headerdefs_core - Core library for summarizing C headers
//!
//! This crate extracts the public surface of a C header (typedefs, function
//! prototypes, structs, enums and macros) and renders it as a compact,
//! sectioned summary. Parsing is done with Tree-sitter, so headers with
//! syntax errors still produce every declaration that can be recovered.
//!
//! # Features
//!
//! - **Parser-independent extraction**: [`extract`] works on any tree that
//!   implements [`SyntaxNode`].
//! - **Origin filtering**: only declarations that come from the header itself
//!   are reported, even when linemarkers splice in other files.
//! - **Visibility filtering**: names starting with `_` are treated as private.
//! - **Multiple Output Formats**: text, ANSI-colored text, JSON and YAML.
//!
//! # Example
//!
//! ```rust,no_run
//! use mta_headerdefs_core::{summarize_header, ExtractConfig, OutputFormat};
//! use std::path::PathBuf;
//!
//! let config = ExtractConfig::new(PathBuf::from("api.h"));
//! let report = summarize_header(&config).unwrap();
//!
//! println!("{}", report.render(OutputFormat::Text, true).unwrap());
//! ```

pub mod config;
pub mod engine;
pub mod extractor;
pub mod models;
pub mod output;
pub mod parsers;
pub mod syntax;

// Re-exports for convenience
pub use config::{ConfigError, ExtractConfig};
pub use engine::{summarize_header, EngineError, HeaderSummarizer};
pub use extractor::extract;
pub use models::{
    DeclKind, Diagnostic, HeaderReport, HeaderSummary, Section, Severity, SummaryMetadata,
};
pub use output::{format_report, format_text, FormatError, OutputFormat};
pub use parsers::{create_parser, CParser, HeaderParser, ParserError, TranslationUnit};
pub use syntax::{DeclNode, SyntaxNode};
