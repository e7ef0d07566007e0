//! ANSI colored output formatter
//!
//! Same layout as the plain text output, with colored section titles and
//! highlighted declaration keywords.

use super::SECTION_DELIMITER;
use crate::models::{HeaderSummary, Section};

// ANSI escape codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const MAGENTA: &str = "\x1b[35m";
const BRIGHT_YELLOW: &str = "\x1b[93m";
const BRIGHT_BLUE: &str = "\x1b[94m";
const BRIGHT_CYAN: &str = "\x1b[96m";
const BRIGHT_GREEN: &str = "\x1b[92m";

/// Get color for a section title
fn section_color(section: Section) -> &'static str {
    match section {
        Section::Typedefs => GREEN,
        Section::Functions => BRIGHT_CYAN,
        Section::Structs => BRIGHT_YELLOW,
        Section::Enums => BRIGHT_GREEN,
        Section::Macros => MAGENTA,
    }
}

/// Format a summary with ANSI colors
pub fn format_ansi(summary: &HeaderSummary, delimiters: bool) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (index, (section, items)) in summary.sections().enumerate() {
        if delimiters && index > 0 {
            lines.push(format!("{}{}{}", DIM, SECTION_DELIMITER, RESET));
        }
        lines.push(format!(
            "{}{}{}{}",
            BOLD,
            section_color(section),
            section.title_line(),
            RESET
        ));
        lines.push(String::new());
        lines.extend(items.iter().map(|item| highlight(item)));
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Highlight the leading keyword of a declaration
fn highlight(declaration: &str) -> String {
    for keyword in ["typedef", "struct", "#define"] {
        if let Some(rest) = declaration.strip_prefix(keyword) {
            if rest.is_empty() || rest.starts_with(' ') {
                return format!("{}{}{}{}", BRIGHT_BLUE, keyword, RESET, rest);
            }
        }
    }
    declaration.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ansi_basic() {
        let summary = HeaderSummary {
            functions: vec!["int add(int a, int b);".to_string()],
            macros: vec!["#define MAX 100".to_string()],
            ..Default::default()
        };

        let output = format_ansi(&summary, true);
        assert!(output.contains("Functions:"));
        assert!(output.contains("int add(int a, int b);"));
        assert!(output.contains(&format!("{}#define{} MAX 100", BRIGHT_BLUE, RESET)));
        assert_eq!(output.matches(SECTION_DELIMITER).count(), 4);
    }

    #[test]
    fn test_highlight_requires_whole_keyword() {
        assert_eq!(highlight("typedefs_are_fun x;"), "typedefs_are_fun x;");
        assert!(highlight("struct P {\n};").starts_with(BRIGHT_BLUE));
    }

    #[test]
    fn test_without_delimiters() {
        let output = format_ansi(&HeaderSummary::default(), false);
        assert!(!output.contains(SECTION_DELIMITER));
        assert_eq!(output.matches("\x1b[1m").count(), 5);
    }
}
