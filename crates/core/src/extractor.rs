//! Declaration extractor
//!
//! Walks the top-level children of a translation unit, drops declarations
//! that come from other files or use a private (`_`-prefixed) name, and
//! renders the rest in a canonical one-declaration-per-entry form.

use crate::models::{DeclKind, HeaderSummary};
use crate::syntax::SyntaxNode;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Placeholder for missing type or name spellings
const NONE: &str = "none";

/// Extract and format the declarations of `target_file_path` found directly
/// under `root`.
///
/// Never fails: empty spellings degrade to `none`. Output is deterministic for
/// a given tree.
pub fn extract<N: SyntaxNode>(root: &N, target_file_path: &Path) -> HeaderSummary {
    let mut origin = OriginFilter::new(target_file_path);
    let mut summary = HeaderSummary::default();

    for node in root.children() {
        if !origin.accepts(node.file()) {
            trace!(
                name = node.spelling(),
                file = ?node.file(),
                "skipping declaration from another file"
            );
            continue;
        }

        let kind = node.kind();
        if kind == DeclKind::Other {
            continue;
        }

        if !is_public_name(node.spelling()) {
            debug!(kind = kind.label(), name = node.spelling(), "skipping private declaration");
            continue;
        }

        match kind {
            DeclKind::Typedef => {
                if let Some(typedef) = format_typedef(node) {
                    summary.typedefs.push(typedef);
                }
            }
            DeclKind::Function => summary.functions.push(format_function(node)),
            DeclKind::Struct => summary.structs.push(format_struct(node)),
            DeclKind::Enum => summary.enums.push(format_enum(node)),
            DeclKind::Macro => summary.macros.push(format_macro(node)),
            DeclKind::EnumConstant | DeclKind::Field | DeclKind::Other => {}
        }
    }

    debug!(
        header = %target_file_path.display(),
        total = summary.total(),
        "extracted declarations"
    );

    summary
}

/// Names that are empty or start with `_` are never emitted
fn is_public_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('_')
}

fn or_none(spelling: &str) -> &str {
    if spelling.is_empty() {
        NONE
    } else {
        spelling
    }
}

/// `typedef <underlying> <name>;`, or `None` for struct-backed typedefs
fn format_typedef<N: SyntaxNode>(node: &N) -> Option<String> {
    let underlying = or_none(node.underlying_type_spelling());

    // Covered by the struct's own declaration
    if underlying.starts_with("struct ") {
        debug!(name = node.spelling(), underlying, "skipping struct-backed typedef");
        return None;
    }

    Some(format!("typedef {} {};", underlying, node.spelling()))
}

/// `<return> <name>(<type> <name>, ...);`
fn format_function<N: SyntaxNode>(node: &N) -> String {
    let params = node
        .arguments()
        .iter()
        .map(|param| format!("{} {}", or_none(param.type_spelling()), or_none(param.spelling())))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{} {}({});",
        or_none(node.result_type_spelling()),
        node.spelling(),
        params
    )
}

fn format_struct<N: SyntaxNode>(node: &N) -> String {
    let mut out = format!("struct {} {{\n", node.spelling());

    for field in node.children().iter().filter(|c| c.kind() == DeclKind::Field) {
        out.push_str(&format!(
            "    {} {};\n",
            or_none(field.type_spelling()),
            or_none(field.spelling())
        ));
    }

    out.push_str("};");
    out
}

fn format_enum<N: SyntaxNode>(node: &N) -> String {
    let mut out = format!("{} {{\n", node.spelling());

    for constant in node
        .children()
        .iter()
        .filter(|c| c.kind() == DeclKind::EnumConstant)
    {
        match constant.enum_value() {
            Some(value) => out.push_str(&format!("    {} = {},\n", constant.spelling(), value)),
            None => out.push_str(&format!("    {},\n", constant.spelling())),
        }
    }

    let body = out.trim_end_matches([',', '\n']);
    format!("{}\n}};", body)
}

/// `#define <name> <tokens...>`
fn format_macro<N: SyntaxNode>(node: &N) -> String {
    let tokens = node.tokens();
    let name = tokens
        .first()
        .map(String::as_str)
        .unwrap_or_else(|| node.spelling());
    let value = tokens.get(1..).unwrap_or_default().join(" ");

    format!("#define {} {}", name, value).trim_end().to_string()
}

/// Decides whether a node's originating file is the header under analysis
struct OriginFilter {
    target: PathBuf,
    seen: HashMap<PathBuf, bool>,
}

impl OriginFilter {
    fn new(target: &Path) -> Self {
        Self {
            target: canonical(target),
            seen: HashMap::new(),
        }
    }

    /// Nodes without a file (built-ins) are always accepted
    fn accepts(&mut self, file: Option<&Path>) -> bool {
        let Some(file) = file else {
            return true;
        };

        if let Some(&same) = self.seen.get(file) {
            return same;
        }

        let same = canonical(file) == self.target;
        self.seen.insert(file.to_path_buf(), same);
        same
    }
}

/// Canonical form of a path, or the path itself when it cannot be resolved
fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::DeclNode;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "/virtual/api.h";

    fn unit(children: Vec<DeclNode>) -> DeclNode {
        DeclNode::root(
            children
                .into_iter()
                .map(|c| if c.file.is_none() { c.in_file(HEADER) } else { c })
                .collect(),
        )
    }

    fn run(children: Vec<DeclNode>) -> HeaderSummary {
        extract(&unit(children), Path::new(HEADER))
    }

    #[test]
    fn test_typedef() {
        let summary = run(vec![DeclNode::typedef("size_t", "unsigned long")]);
        assert_eq!(summary.typedefs, ["typedef unsigned long size_t;"]);
    }

    #[test]
    fn test_struct_backed_typedef_is_skipped() {
        let summary = run(vec![
            DeclNode::typedef("Anon", "struct Anonymous"),
            DeclNode::typedef("Color", "enum Color"),
        ]);
        assert_eq!(summary.typedefs, ["typedef enum Color Color;"]);
    }

    #[test]
    fn test_typedef_without_underlying_spelling() {
        let summary = run(vec![DeclNode::typedef("mystery", "")]);
        assert_eq!(summary.typedefs, ["typedef none mystery;"]);
    }

    #[test]
    fn test_function() {
        let summary = run(vec![DeclNode::function(
            "add",
            "int",
            vec![DeclNode::param("a", "int"), DeclNode::param("b", "int")],
        )]);
        assert_eq!(summary.functions, ["int add(int a, int b);"]);
    }

    #[test]
    fn test_function_fallbacks() {
        let summary = run(vec![
            DeclNode::function("init", "void", vec![]),
            DeclNode::function("odd", "", vec![DeclNode::param("", "char *")]),
        ]);
        assert_eq!(summary.functions, ["void init();", "none odd(char * none);"]);
    }

    #[test]
    fn test_struct() {
        let summary = run(vec![DeclNode::structure(
            "Point",
            vec![DeclNode::field("x", "int"), DeclNode::field("y", "int")],
        )]);
        assert_eq!(summary.structs, ["struct Point {\n    int x;\n    int y;\n};"]);
    }

    #[test]
    fn test_struct_keeps_private_fields_and_ignores_non_fields() {
        let summary = run(vec![DeclNode::structure(
            "Buffer",
            vec![
                DeclNode::field("_len", "size_t"),
                DeclNode::structure("Inner", vec![]),
                DeclNode::field("", "union (unnamed)"),
                DeclNode::field("data", "char *"),
            ],
        )]);
        assert_eq!(
            summary.structs,
            ["struct Buffer {\n    size_t _len;\n    union (unnamed) none;\n    char * data;\n};"]
        );
    }

    #[test]
    fn test_empty_struct() {
        let summary = run(vec![DeclNode::structure("Opaque", vec![])]);
        assert_eq!(summary.structs, ["struct Opaque {\n};"]);
    }

    #[test]
    fn test_enum_values_are_not_inferred() {
        let summary = run(vec![DeclNode::enumeration(
            "Level",
            vec![
                DeclNode::enum_constant("LOW", Some(5)),
                DeclNode::enum_constant("HIGH", None),
                DeclNode::enum_constant("_RESERVED", Some(-1)),
            ],
        )]);
        assert_eq!(
            summary.enums,
            ["Level {\n    LOW = 5,\n    HIGH,\n    _RESERVED = -1\n};"]
        );
    }

    #[test]
    fn test_empty_enum() {
        let summary = run(vec![DeclNode::enumeration("Nothing", vec![])]);
        assert_eq!(summary.enums, ["Nothing {\n};"]);
    }

    #[test]
    fn test_macros() {
        let summary = run(vec![
            DeclNode::macro_def(&["MAX", "100"]),
            DeclNode::macro_def(&["FLAG"]),
            DeclNode::macro_def(&["SQ", "(", "x", ")", "(", "(", "x", ")", "*", "(", "x", ")", ")"]),
        ]);
        assert_eq!(
            summary.macros,
            ["#define MAX 100", "#define FLAG", "#define SQ ( x ) ( ( x ) * ( x ) )"]
        );
    }

    #[test]
    fn test_private_names_are_filtered_for_every_kind() {
        let summary = run(vec![
            DeclNode::typedef("_priv_t", "int"),
            DeclNode::function("_helper", "void", vec![]),
            DeclNode::structure("_impl", vec![DeclNode::field("x", "int")]),
            DeclNode::enumeration("_State", vec![DeclNode::enum_constant("A", None)]),
            DeclNode::macro_def(&["_GUARD_H"]),
        ]);
        assert!(summary.is_empty());
    }

    #[test]
    fn test_empty_names_are_filtered() {
        let summary = run(vec![
            DeclNode::structure("", vec![DeclNode::field("x", "int")]),
            DeclNode::enumeration("", vec![DeclNode::enum_constant("A", Some(0))]),
        ]);
        assert!(summary.is_empty());
    }

    #[test]
    fn test_declarations_from_other_files_are_filtered() {
        let summary = run(vec![
            DeclNode::typedef("uint32_t", "unsigned int").in_file("/usr/include/stdint.h"),
            DeclNode::function("open_api", "int", vec![]),
        ]);
        assert!(summary.typedefs.is_empty());
        assert_eq!(summary.functions, ["int open_api();"]);
    }

    #[test]
    fn test_nodes_without_file_are_kept() {
        let root = DeclNode::root(vec![DeclNode::macro_def(&["STDC_VERSION", "201112L"])]);
        let summary = extract(&root, Path::new(HEADER));
        assert_eq!(summary.macros, ["#define STDC_VERSION 201112L"]);
    }

    #[test]
    fn test_origin_compares_canonical_paths() {
        let dir = TempDir::new().unwrap();
        let header = dir.path().join("api.h");
        fs::write(&header, "int f(void);\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let indirect = dir.path().join("sub").join("..").join("api.h");
        let root = DeclNode::root(vec![
            DeclNode::function("f", "int", vec![]).in_file(&indirect),
            DeclNode::function("g", "int", vec![]).in_file(dir.path().join("other.h")),
        ]);

        let summary = extract(&root, &header);
        assert_eq!(summary.functions, ["int f();"]);
    }

    #[test]
    fn test_order_is_preserved_and_extraction_is_idempotent() {
        let root = unit(vec![
            DeclNode::macro_def(&["B"]),
            DeclNode::function("second", "void", vec![]),
            DeclNode::macro_def(&["A"]),
            DeclNode::function("first", "void", vec![]),
            DeclNode::new(DeclKind::Other, "global_var"),
        ]);

        let first = extract(&root, Path::new(HEADER));
        let second = extract(&root, Path::new(HEADER));

        assert_eq!(first, second);
        assert_eq!(first.macros, ["#define B", "#define A"]);
        assert_eq!(first.functions, ["void second();", "void first();"]);
    }
}
