//! C header parser
//!
//! Parses headers with Tree-sitter and lowers the concrete syntax tree into
//! [`DeclNode`]s shaped the way a C front end reports declarations: one node
//! per declarator, struct and enum bodies as their own top-level nodes, type
//! spellings with the declared name removed, and macros as raw token lists.

use crate::models::{DeclKind, Diagnostic, Severity};
use crate::parsers::consteval;
use crate::parsers::lexer::tokenize;
use crate::parsers::{HeaderParser, ParserError, TranslationUnit};
use crate::syntax::DeclNode;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, trace};
use tree_sitter::{Node, Parser, Tree};

/// Spelling used for anonymous struct/union/enum types
const UNNAMED: &str = "(unnamed)";

/// C parser implementation
pub struct CParser {
    parser: Parser,
}

impl CParser {
    /// Create a new C parser
    pub fn new() -> Result<Self, ParserError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c::LANGUAGE.into())
            .map_err(|e| ParserError::InitError(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse source code into a tree
    fn parse_tree(&mut self, source: &str) -> Result<Tree, ParserError> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| ParserError::ParseError("Failed to parse source".to_string()))
    }
}

impl HeaderParser for CParser {
    fn parse(&mut self, source: &str, path: &Path) -> Result<TranslationUnit, ParserError> {
        let cleaned = strip_trailing_blanks(source);
        let source: &str = &cleaned;
        let tree = self.parse_tree(source)?;
        let root = tree.root_node();

        let origins = LineOrigins::scan(source, path);
        let mut lowering = Lowering {
            source: source.as_bytes(),
            origins: &origins,
            nodes: Vec::new(),
        };
        lowering.items(&root);

        let mut diagnostics = Vec::new();
        if root.has_error() {
            collect_diagnostics(&root, source.as_bytes(), &mut diagnostics);
        }

        debug!(
            path = %path.display(),
            declarations = lowering.nodes.len(),
            diagnostics = diagnostics.len(),
            "parsed header"
        );

        Ok(TranslationUnit {
            path: path.to_path_buf(),
            root: DeclNode::root(lowering.nodes),
            diagnostics,
        })
    }
}

/// Maps source lines to the file they came from
///
/// Preprocessed input (`cc -E`) carries linemarkers such as `# 12 "foo.h" 1`;
/// each one switches the origin of the lines that follow it.
struct LineOrigins {
    header: PathBuf,
    /// (row of the marker, file it introduces), in source order
    markers: Vec<(usize, Option<PathBuf>)>,
}

impl LineOrigins {
    fn scan(source: &str, header: &Path) -> Self {
        static LINEMARKER: OnceLock<Regex> = OnceLock::new();
        let re = LINEMARKER.get_or_init(|| {
            Regex::new(r#"(?m)^[ \t]*#[ \t]*(?:line[ \t]+)?\d+[ \t]+"((?:[^"\\\n]|\\.)*)""#)
                .expect("linemarker pattern is valid")
        });

        let mut markers = Vec::new();
        let mut row = 0;
        let mut last = 0;
        for caps in re.captures_iter(source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            row += source[last..whole.start()].matches('\n').count();
            last = whole.start();

            let name = name.as_str().replace("\\\\", "\\").replace("\\\"", "\"");
            // <built-in>, <command line>: no real file
            let file = if name.starts_with('<') {
                None
            } else {
                Some(PathBuf::from(name))
            };
            trace!(row, file = ?file, "linemarker");
            markers.push((row, file));
        }

        Self {
            header: header.to_path_buf(),
            markers,
        }
    }

    /// File a node starting on `row` (0-indexed) originates from
    fn file_at(&self, row: usize) -> Option<PathBuf> {
        match self.markers.iter().rev().find(|(marker_row, _)| *marker_row < row) {
            Some((_, file)) => file.clone(),
            None => Some(self.header.clone()),
        }
    }
}

/// Lowers a tree-sitter C tree into declaration nodes
struct Lowering<'a> {
    source: &'a [u8],
    origins: &'a LineOrigins,
    nodes: Vec<DeclNode>,
}

impl<'a> Lowering<'a> {
    fn text(&self, node: &Node) -> &'a str {
        node.utf8_text(self.source).unwrap_or("")
    }

    /// Stamp origin and line onto a freshly built node
    fn located(&self, decl: DeclNode, at: &Node) -> DeclNode {
        let row = at.start_position().row;
        let mut decl = decl.at_line(row + 1);
        decl.file = self.origins.file_at(row);
        decl
    }

    /// Lower every top-level item below `node`
    fn items(&mut self, node: &Node) {
        for item in flatten_block(node) {
            self.item(&item);
        }
    }

    fn item(&mut self, node: &Node) {
        match node.kind() {
            "type_definition" => self.type_definition(node),
            "declaration" | "function_definition" => self.declaration(node),
            // `struct Foo;` and `struct Foo { ... };`
            "struct_specifier" | "enum_specifier" => {
                if let Some(decl) = self.tagged(node) {
                    self.nodes.push(decl);
                }
            }
            "preproc_def" | "preproc_function_def" => self.macro_definition(node),
            "linkage_specification" => {
                if let Some(body) = node.child_by_field_name("body") {
                    if body.kind() == "declaration_list" {
                        self.items(&body);
                    } else {
                        self.item(&body);
                    }
                }
            }
            // Recover what we can from broken regions
            "ERROR" | "declaration_list" => self.items(node),
            _ => {}
        }
    }

    fn type_definition(&mut self, node: &Node) {
        let mut cursor = node.walk();
        let declarators: Vec<Node> = node
            .children_by_field_name("declarator", &mut cursor)
            .collect();

        // `typedef struct { ... } Name;` names the anonymous tag `Name`
        let tag = declarators
            .first()
            .filter(|d| d.kind() == "type_identifier")
            .map(|d| self.text(d));

        self.lower_tag_body_named(node, tag);
        let base = self.base_type_named(node, tag);

        for declarator in declarators {
            let (name, suffix) = self.split_declarator(&declarator);
            let mut decl = DeclNode::new(DeclKind::Typedef, name.clone()).with_type(name);
            decl.underlying_type = join_type(&base, &suffix);
            let decl = self.located(decl, node);
            self.nodes.push(decl);
        }
    }

    /// Function prototypes and definitions; other declarations only
    /// contribute the struct/enum bodies they define
    fn declaration(&mut self, node: &Node) {
        self.lower_tag_body(node);
        let base = self.base_type(node);

        let mut cursor = node.walk();
        let declarators: Vec<Node> = node
            .children_by_field_name("declarator", &mut cursor)
            .collect();

        for declarator in declarators {
            let declarator = if declarator.kind() == "init_declarator" {
                match declarator.child_by_field_name("declarator") {
                    Some(inner) => inner,
                    None => continue,
                }
            } else {
                declarator
            };

            if let Some(function) = function_declarator(&declarator) {
                let decl = self.function(&base, &declarator, &function);
                let decl = self.located(decl, node);
                self.nodes.push(decl);
            }
        }
    }

    fn function(&self, base: &str, declarator: &Node, function: &Node) -> DeclNode {
        let name = function
            .child_by_field_name("declarator")
            .and_then(|n| declarator_name(&n))
            .map(|n| self.text(&n))
            .unwrap_or("");
        let result_type = join_type(base, &self.splice_out(declarator, function));

        let arguments = function
            .child_by_field_name("parameters")
            .map(|params| self.parameters(&params))
            .unwrap_or_default();

        DeclNode::function(name, &result_type, arguments)
    }

    fn parameters(&self, list: &Node) -> Vec<DeclNode> {
        let mut cursor = list.walk();
        let params: Vec<Node> = list
            .named_children(&mut cursor)
            .filter(|p| p.kind() == "parameter_declaration")
            .collect();

        // `(void)` declares no parameters
        if let [only] = params.as_slice() {
            if only.child_by_field_name("declarator").is_none() && self.base_type(only) == "void" {
                return Vec::new();
            }
        }

        params
            .iter()
            .map(|param| {
                let base = self.base_type(param);
                match param.child_by_field_name("declarator") {
                    Some(declarator) => {
                        let (name, suffix) = self.split_declarator(&declarator);
                        let suffix = self.decayed_array(&declarator).unwrap_or(suffix);
                        DeclNode::param(&name, &join_type(&base, &suffix))
                    }
                    None => DeclNode::param("", &base),
                }
            })
            .collect()
    }

    /// Emit the struct or enum defined inline by a declaration's type
    fn lower_tag_body(&mut self, node: &Node) {
        self.lower_tag_body_named(node, None);
    }

    fn lower_tag_body_named(&mut self, node: &Node, tag: Option<&str>) {
        let Some(type_node) = node.child_by_field_name("type") else {
            return;
        };
        if type_node.child_by_field_name("body").is_none() {
            return;
        }
        if let Some(decl) = self.tagged_named(&type_node, tag) {
            self.nodes.push(decl);
        }
    }

    /// Lower a struct or enum specifier; unions are not reported
    fn tagged(&self, node: &Node) -> Option<DeclNode> {
        self.tagged_named(node, None)
    }

    /// `tag` names the specifier when it has no name of its own
    fn tagged_named(&self, node: &Node, tag: Option<&str>) -> Option<DeclNode> {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(&n))
            .or(tag)
            .unwrap_or("");
        let body = node.child_by_field_name("body");
        let spelling = self.type_spelling_named(node, tag);

        let decl = match node.kind() {
            "struct_specifier" => {
                let fields = body.map(|b| self.fields(&b)).unwrap_or_default();
                DeclNode::structure(name, fields).with_type(spelling)
            }
            "enum_specifier" => {
                let constants = body.map(|b| self.enumerators(&b)).unwrap_or_default();
                DeclNode::enumeration(name, constants).with_type(spelling)
            }
            _ => return None,
        };

        Some(self.located(decl, node))
    }

    fn fields(&self, body: &Node) -> Vec<DeclNode> {
        let mut fields = Vec::new();

        for item in flatten_block(body) {
            if item.kind() != "field_declaration" {
                continue;
            }
            let base = self.base_type(&item);

            let mut cursor = item.walk();
            let declarators: Vec<Node> = item
                .children_by_field_name("declarator", &mut cursor)
                .collect();

            if declarators.is_empty() {
                // Anonymous struct/union member
                fields.push(self.located(DeclNode::field("", &base), &item));
                continue;
            }

            for declarator in declarators {
                let (name, suffix) = self.split_declarator(&declarator);
                let field = DeclNode::field(&name, &join_type(&base, &suffix));
                fields.push(self.located(field, &item));
            }
        }

        fields
    }

    fn enumerators(&self, body: &Node) -> Vec<DeclNode> {
        let mut known = HashMap::new();
        let mut constants = Vec::new();

        for item in flatten_block(body) {
            if item.kind() != "enumerator" {
                continue;
            }
            let name = item
                .child_by_field_name("name")
                .map(|n| self.text(&n))
                .unwrap_or("");
            let value = item
                .child_by_field_name("value")
                .and_then(|v| consteval::evaluate(&v, self.source, &known));

            if let Some(value) = value {
                known.insert(name.to_string(), value);
            }
            constants.push(self.located(DeclNode::enum_constant(name, value), &item));
        }

        constants
    }

    /// `#define` directive; the definition ends at the first unescaped newline
    fn macro_definition(&mut self, node: &Node) {
        let Some(name) = node.child_by_field_name("name") else {
            return;
        };
        let end = node.end_byte().min(self.source.len());
        let text = std::str::from_utf8(&self.source[name.start_byte()..end]).unwrap_or("");
        let definition = logical_lines(text).first().copied().unwrap_or("");

        let mut decl = DeclNode::new(DeclKind::Macro, self.text(&name));
        decl.tokens = tokenize(definition);
        let decl = self.located(decl, node);
        self.nodes.push(decl);
    }

    /// Qualifiers and type specifier of a declaration, e.g. `const char`
    fn base_type(&self, node: &Node) -> String {
        self.base_type_named(node, None)
    }

    fn base_type_named(&self, node: &Node, tag: Option<&str>) -> String {
        let mut parts = Vec::new();
        let mut cursor = node.walk();

        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                if cursor.field_name() == Some("type") {
                    parts.push(self.type_spelling_named(&child, tag));
                } else if child.kind() == "type_qualifier" {
                    parts.push(self.text(&child).to_string());
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }

        parts.join(" ")
    }

    /// Spelling of a type specifier; tagged types never include their body
    fn type_spelling(&self, node: &Node) -> String {
        self.type_spelling_named(node, None)
    }

    fn type_spelling_named(&self, node: &Node, tag: Option<&str>) -> String {
        let keyword = match node.kind() {
            "struct_specifier" => "struct",
            "union_specifier" => "union",
            "enum_specifier" => "enum",
            _ => return normalize_type(self.text(node)),
        };

        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(&n))
            .or(tag)
            .unwrap_or(UNNAMED);
        format!("{} {}", keyword, name)
    }

    /// Split a declarator into its name and the type text left around it
    fn split_declarator(&self, declarator: &Node) -> (String, String) {
        match declarator_name(declarator) {
            Some(name) => (
                self.text(&name).to_string(),
                self.splice_out(declarator, &name),
            ),
            None => (String::new(), normalize_type(self.text(declarator))),
        }
    }

    /// Declarator text of an array parameter adjusted to a pointer
    /// (`a[]` -> `*`, `m[3][4]` -> `(*)[4]`, `*argv[]` -> `**`)
    fn decayed_array(&self, declarator: &Node) -> Option<String> {
        let Some(name) = declarator_name(declarator) else {
            return decay_abstract_array(&normalize_type(self.text(declarator)));
        };
        let array = name.parent()?;
        if array.kind() != "array_declarator" || array.child_by_field_name("declarator") != Some(name) {
            return None;
        }

        let text = self.text(declarator);
        let start = array.start_byte().checked_sub(declarator.start_byte())?;
        let end = array.end_byte().checked_sub(declarator.start_byte())?;
        let (before, after) = (text.get(..start)?, text.get(end..)?);
        let pointer = if after.trim_start().starts_with(['[', '(']) {
            "(*)"
        } else {
            "*"
        };
        Some(normalize_type(&format!("{}{}{}", before, pointer, after)))
    }

    /// Text of `outer` with `inner` cut out, normalized
    fn splice_out(&self, outer: &Node, inner: &Node) -> String {
        let text = self.text(outer);
        let start = inner.start_byte().saturating_sub(outer.start_byte()).min(text.len());
        let end = inner.end_byte().saturating_sub(outer.start_byte()).min(text.len());
        normalize_type(&format!("{}{}", &text[..start], &text[end..]))
    }
}

/// Children of a block with preprocessor conditionals opened up
///
/// Every branch is kept: conditions are never evaluated.
fn flatten_block<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut cursor = node.walk();

    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            let is_guard = matches!(cursor.field_name(), Some("condition") | Some("name"));
            if child.is_named() && !is_guard && child.kind() != "comment" {
                if is_conditional(child.kind()) {
                    out.extend(flatten_block(&child));
                } else {
                    out.push(child);
                }
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    out
}

fn is_conditional(kind: &str) -> bool {
    matches!(
        kind,
        "preproc_if" | "preproc_ifdef" | "preproc_else" | "preproc_elif" | "preproc_elifdef"
    )
}

fn is_name(kind: &str) -> bool {
    matches!(
        kind,
        "identifier" | "type_identifier" | "field_identifier" | "primitive_type"
    )
}

/// Inner declarator of a wrapper such as `attributed_declarator`
fn inner_declarator<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    if let Some(inner) = node.child_by_field_name("declarator") {
        return Some(inner);
    }
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|c| is_name(c.kind()) || c.kind().ends_with("declarator"));
    found
}

/// The identifier a declarator declares, if any
fn declarator_name<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    if is_name(node.kind()) {
        return Some(*node);
    }
    declarator_name(&inner_declarator(node)?)
}

/// Function declarator naming a function directly
///
/// Looks through pointer, attribute and parenthesis wrappers and through the
/// outer declarators of a function returning a function pointer. Function
/// pointer variables yield `None`.
fn function_declarator<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    let mut current = *node;
    loop {
        match current.kind() {
            "function_declarator" => {
                let inner = strip_parens(current.child_by_field_name("declarator")?)?;
                if is_name(inner.kind()) {
                    return Some(current);
                }
                current = inner;
            }
            "pointer_declarator" | "attributed_declarator" | "parenthesized_declarator" => {
                current = inner_declarator(&current)?;
            }
            _ => return None,
        }
    }
}

fn strip_parens<'t>(mut node: Node<'t>) -> Option<Node<'t>> {
    while node.kind() == "parenthesized_declarator" {
        node = inner_declarator(&node)?;
    }
    Some(node)
}

/// Drop spaces and tabs at line ends
///
/// Tree-sitter lets a bodiless `#define NAME ` with trailing blanks run into
/// the next line. Rows and the columns of remaining text are unchanged.
fn strip_trailing_blanks(source: &str) -> Cow<'_, str> {
    let has_trailing = source
        .split('\n')
        .any(|line| line.trim_end_matches('\r').ends_with([' ', '\t']));
    if !has_trailing {
        return Cow::Borrowed(source);
    }

    let lines: Vec<String> = source
        .split('\n')
        .map(|line| match line.strip_suffix('\r') {
            Some(body) => format!("{}\r", body.trim_end_matches([' ', '\t'])),
            None => line.trim_end_matches([' ', '\t']).to_string(),
        })
        .collect();
    Cow::Owned(lines.join("\n"))
}

/// Split text at newlines that are not escaped by a line continuation
fn logical_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        if b != b'\n' {
            continue;
        }
        let before = &bytes[start..i];
        let before = before.strip_suffix(b"\r").unwrap_or(before);
        if before.ends_with(b"\\") {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + 1;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }

    lines
}

/// Adjust an unnamed array parameter such as `[]` or `[3][4]`
fn decay_abstract_array(suffix: &str) -> Option<String> {
    let rest = suffix.strip_prefix('[')?;
    let close = rest.find(']')?;
    let after = &rest[close + 1..];
    if after.is_empty() {
        Some("*".to_string())
    } else {
        Some(format!("(*){}", after))
    }
}

/// Combine a base type with the declarator text around a name
fn join_type(base: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        base.to_string()
    } else if base.is_empty() {
        suffix.to_string()
    } else if suffix.starts_with('[') {
        format!("{}{}", base, suffix)
    } else {
        format!("{} {}", base, suffix)
    }
}

/// Collapse whitespace and drop it where C type spellings have none
/// (`* const` -> `*const`, `(* )(int)` -> `(*)(int)`, `* []` -> `*[]`)
fn normalize_type(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let chars: Vec<char> = collapsed.chars().collect();
    let mut out = String::with_capacity(collapsed.len());

    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev = chars.get(i.wrapping_sub(1)).copied();
            let next = chars.get(i + 1).copied();
            let glued = matches!(prev, Some('*') | Some('(') | Some('['))
                || matches!(next, Some(')') | Some(']') | Some(',') | Some('['));
            if glued {
                continue;
            }
        }
        out.push(c);
    }

    out
}

/// Collect ERROR and MISSING nodes as diagnostics
fn collect_diagnostics(node: &Node, source: &[u8], diagnostics: &mut Vec<Diagnostic>) {
    if node.is_error() || node.is_missing() {
        let pos = node.start_position();
        let (severity, message) = if node.is_missing() {
            (Severity::Warning, format!("missing `{}`", node.kind()))
        } else {
            let snippet: String = node
                .utf8_text(source)
                .unwrap_or("")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .chars()
                .take(40)
                .collect();
            (Severity::Error, format!("syntax error near `{}`", snippet))
        };

        diagnostics.push(Diagnostic {
            severity,
            line: pos.row + 1,
            column: pos.column + 1,
            message,
        });
    }

    if !node.has_error() {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_diagnostics(&child, source, diagnostics);
    }
}
