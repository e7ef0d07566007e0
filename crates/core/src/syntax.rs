//! Syntax node abstraction
//!
//! The extractor never talks to a parser directly. It reads a tree through the
//! [`SyntaxNode`] trait, which exposes only what a C front end reports about a
//! declaration: its kind, name, origin, types, children and raw tokens.
//! [`DeclNode`] is the owned tree produced by the bundled tree-sitter adapter.

use crate::models::DeclKind;
use std::path::{Path, PathBuf};

/// Read-only view of one node in a parsed translation unit
pub trait SyntaxNode: Sized {
    /// Declaration kind
    fn kind(&self) -> DeclKind;

    /// Declared name, possibly empty
    fn spelling(&self) -> &str;

    /// File the node originates from, `None` for built-ins
    fn file(&self) -> Option<&Path>;

    /// Child nodes in source order
    fn children(&self) -> &[Self];

    /// Type of the node (typedefs, functions, fields, parameters)
    fn type_spelling(&self) -> &str;

    /// Return type of a function
    fn result_type_spelling(&self) -> &str;

    /// Parameters of a function, in declaration order
    fn arguments(&self) -> &[Self];

    /// Aliased type of a typedef
    fn underlying_type_spelling(&self) -> &str;

    /// Value of an enum constant, when the parser supplies one
    fn enum_value(&self) -> Option<i64>;

    /// Raw token spellings (macros)
    fn tokens(&self) -> &[String];
}

/// Owned syntax node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclNode {
    pub kind: DeclKind,
    pub spelling: String,
    pub file: Option<PathBuf>,
    pub children: Vec<DeclNode>,
    pub type_spelling: String,
    pub result_type: String,
    pub arguments: Vec<DeclNode>,
    pub underlying_type: String,
    pub enum_value: Option<i64>,
    pub tokens: Vec<String>,
    /// Starting line number (1-indexed), informational only
    pub line: usize,
}

impl DeclNode {
    /// Create a node with the given kind and name
    pub fn new(kind: DeclKind, spelling: impl Into<String>) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            file: None,
            children: Vec::new(),
            type_spelling: String::new(),
            result_type: String::new(),
            arguments: Vec::new(),
            underlying_type: String::new(),
            enum_value: None,
            tokens: Vec::new(),
            line: 0,
        }
    }

    /// Root node of a translation unit
    pub fn root(children: Vec<DeclNode>) -> Self {
        Self::new(DeclKind::Other, "").with_children(children)
    }

    pub fn typedef(name: &str, underlying: &str) -> Self {
        let mut node = Self::new(DeclKind::Typedef, name);
        node.underlying_type = underlying.to_string();
        node.type_spelling = name.to_string();
        node
    }

    pub fn function(name: &str, result_type: &str, arguments: Vec<DeclNode>) -> Self {
        let mut node = Self::new(DeclKind::Function, name);
        node.type_spelling = format!(
            "{} ({})",
            result_type,
            arguments
                .iter()
                .map(|a| a.type_spelling.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        node.result_type = result_type.to_string();
        node.arguments = arguments;
        node
    }

    /// Function parameter
    pub fn param(name: &str, type_spelling: &str) -> Self {
        Self::new(DeclKind::Other, name).with_type(type_spelling)
    }

    pub fn field(name: &str, type_spelling: &str) -> Self {
        Self::new(DeclKind::Field, name).with_type(type_spelling)
    }

    pub fn structure(name: &str, fields: Vec<DeclNode>) -> Self {
        Self::new(DeclKind::Struct, name).with_children(fields)
    }

    pub fn enumeration(name: &str, constants: Vec<DeclNode>) -> Self {
        Self::new(DeclKind::Enum, name).with_children(constants)
    }

    pub fn enum_constant(name: &str, value: Option<i64>) -> Self {
        let mut node = Self::new(DeclKind::EnumConstant, name);
        node.enum_value = value;
        node
    }

    /// Macro definition from its token spellings; the first token is the name
    pub fn macro_def<S: AsRef<str>>(tokens: &[S]) -> Self {
        let tokens: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
        let name = tokens.first().cloned().unwrap_or_default();
        let mut node = Self::new(DeclKind::Macro, name);
        node.tokens = tokens;
        node
    }

    /// Set originating file (builder pattern)
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Set type spelling (builder pattern)
    pub fn with_type(mut self, type_spelling: impl Into<String>) -> Self {
        self.type_spelling = type_spelling.into();
        self
    }

    /// Set children (builder pattern)
    pub fn with_children(mut self, children: Vec<DeclNode>) -> Self {
        self.children = children;
        self
    }

    /// Set line (builder pattern)
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }
}

impl SyntaxNode for DeclNode {
    fn kind(&self) -> DeclKind {
        self.kind
    }

    fn spelling(&self) -> &str {
        &self.spelling
    }

    fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn type_spelling(&self) -> &str {
        &self.type_spelling
    }

    fn result_type_spelling(&self) -> &str {
        &self.result_type
    }

    fn arguments(&self) -> &[Self] {
        &self.arguments
    }

    fn underlying_type_spelling(&self) -> &str {
        &self.underlying_type
    }

    fn enum_value(&self) -> Option<i64> {
        self.enum_value
    }

    fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_type_spelling() {
        let node = DeclNode::function(
            "add",
            "int",
            vec![DeclNode::param("a", "int"), DeclNode::param("b", "int")],
        );

        assert_eq!(node.type_spelling(), "int (int, int)");
        assert_eq!(node.result_type_spelling(), "int");
        assert_eq!(node.arguments().len(), 2);
    }

    #[test]
    fn test_macro_name_is_first_token() {
        let node = DeclNode::macro_def(&["MAX", "100"]);
        assert_eq!(node.kind(), DeclKind::Macro);
        assert_eq!(node.spelling(), "MAX");
        assert_eq!(node.tokens(), ["MAX", "100"]);
    }

    #[test]
    fn test_builtin_has_no_file() {
        let node = DeclNode::macro_def(&["__STDC__", "1"]);
        assert!(node.file().is_none());
        assert!(node.in_file("a.h").file().is_some());
    }
}
