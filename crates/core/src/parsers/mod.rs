//! Parsers module for C headers
//!
//! This module turns header source into a [`TranslationUnit`]: an owned tree
//! of [`DeclNode`]s plus the diagnostics the parser raised. Tree-sitter does
//! the parsing, so broken input still yields every declaration it can recover.

mod c;
mod consteval;
mod lexer;

pub use c::CParser;
pub use lexer::tokenize;

use crate::models::Diagnostic;
use crate::syntax::DeclNode;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Parser errors
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Failed to initialize parser: {0}")]
    InitError(String),

    #[error("Failed to parse source code: {0}")]
    ParseError(String),
}

/// A parsed header
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    /// Path the source was read from
    pub path: PathBuf,

    /// Root node; its children are the top-level declarations
    pub root: DeclNode,

    pub diagnostics: Vec<Diagnostic>,
}

/// Trait for header parsers
pub trait HeaderParser: Send {
    /// Parse header source; `path` becomes the origin of its declarations
    fn parse(&mut self, source: &str, path: &Path) -> Result<TranslationUnit, ParserError>;
}

/// Create the default header parser
pub fn create_parser() -> Result<Box<dyn HeaderParser>, ParserError> {
    Ok(Box::new(CParser::new()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxNode;

    #[test]
    fn test_create_parser() {
        let mut parser = create_parser().unwrap();
        let unit = parser.parse("int f(void);\n", Path::new("f.h")).unwrap();

        assert_eq!(unit.path, PathBuf::from("f.h"));
        assert_eq!(unit.root.children().len(), 1);
    }

    #[test]
    fn test_parser_is_reusable() {
        let mut parser = create_parser().unwrap();
        let first = parser.parse("#define A 1\n", Path::new("a.h")).unwrap();
        let second = parser.parse("#define B 2\n", Path::new("b.h")).unwrap();

        assert_eq!(first.root.children()[0].spelling(), "A");
        assert_eq!(second.root.children()[0].spelling(), "B");
    }
}
