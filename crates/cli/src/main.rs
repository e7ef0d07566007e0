//! mta-headerdefs CLI
//!
//! Summarizes the public declarations of a C header: typedefs, function
//! prototypes, structs, enums and macros.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use mta_headerdefs_core::{
    Diagnostic, EngineError, ExtractConfig, HeaderReport, HeaderSummarizer, OutputFormat,
    ParserError,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Summarize the public declarations of a C header
#[derive(Parser, Debug)]
#[command(name = "mta-headerdefs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Summarize typedefs, functions, structs, enums and macros of a C header")]
#[command(long_about = r#"
mta-headerdefs: C Header Summaries

Parses a C header and prints its public surface grouped into five sections:
Typedefs, Functions, Structs, Enums and Macros. Declarations pulled in from
other files and names starting with an underscore are left out.

Output formats:
  - text (default) - Section headers followed by declarations
  - ansi - Colorful terminal output
  - json - Structured JSON for programmatic use
  - yaml - Human-readable YAML format

Examples:
  mta-headerdefs api.h                      # Print summary
  mta-headerdefs api.h --out api.txt        # Write summary to a file
  mta-headerdefs api.h --format json        # JSON report with diagnostics
  mta-headerdefs api.h --strict             # Fail on syntax errors
"#)]
pub struct Args {
    /// Header file to summarize
    pub header: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Text)]
    pub format: OutputFormatArg,

    /// Do not print `---` between sections
    #[arg(long)]
    pub no_delimiters: bool,

    /// Exit with an error when the header has syntax errors
    #[arg(long)]
    pub strict: bool,

    /// Maximum header size in bytes
    #[arg(long, default_value_t = 10 * 1024 * 1024)]
    pub max_file_size: u64,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format argument
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum OutputFormatArg {
    Text,
    Json,
    Yaml,
    Ansi,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Text => OutputFormat::Text,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Yaml => OutputFormat::Yaml,
            OutputFormatArg::Ansi => OutputFormat::Ansi,
        }
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(err) = run(&args) {
        eprintln!("[ERROR] {:#}", err);
        if is_parser_init_failure(&err) {
            eprintln!("The bundled C grammar is incompatible with the tree-sitter runtime.");
        }
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "mta_headerdefs_core=debug,mta_headerdefs=debug"
    } else {
        "mta_headerdefs_core=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Build extraction configuration from args
fn build_config(args: &Args) -> ExtractConfig {
    ExtractConfig::new(args.header.clone())
        .with_format(args.format.clone().into())
        .with_section_delimiters(!args.no_delimiters)
        .with_strict(args.strict)
        .with_max_file_size(args.max_file_size)
}

fn run(args: &Args) -> Result<()> {
    let config = build_config(args);
    tracing::debug!(header = %config.header.display(), format = %config.format, "starting");

    // Show progress spinner
    let spinner = if args.verbose && atty::is(atty::Stream::Stderr) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Parsing {}...", config.header.display()));
        Some(pb)
    } else {
        None
    };

    let mut summarizer =
        HeaderSummarizer::new(config.clone()).context("Failed to initialize C parser")?;
    let result = summarizer.summarize();

    if let Some(ref pb) = spinner {
        pb.finish_and_clear();
    }

    let report = result.with_context(|| format!("Failed to summarize {}", config.header.display()))?;
    print_diagnostics(&report);

    let settings = summarizer.config();
    let output = report
        .render(settings.format, settings.section_delimiters)
        .context("Failed to format output")?;

    write_output(&output, args.out.as_deref())?;

    Ok(())
}

/// Report parser diagnostics on stderr
fn print_diagnostics(report: &HeaderReport) {
    for diagnostic in &report.diagnostics {
        eprintln!("{}", diagnostic_line(&report.header, diagnostic));
    }
}

fn diagnostic_line(header: &Path, diagnostic: &Diagnostic) -> String {
    format!(
        "[{}] {}:{}:{}: {}",
        diagnostic.severity,
        header.display(),
        diagnostic.line,
        diagnostic.column,
        diagnostic.message
    )
}

fn is_parser_init_failure(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<EngineError>(),
            Some(EngineError::ParserError(ParserError::InitError(_)))
        )
    })
}

fn write_output(output: &str, path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, output)
            .with_context(|| format!("Failed to write output file {}", path.display()))?;
    } else {
        println!("{}", output);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mta_headerdefs_core::Severity;
    use tempfile::TempDir;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["mta-headerdefs", "api.h"]).unwrap();
        assert_eq!(args.header, PathBuf::from("api.h"));
        assert_eq!(args.format, OutputFormatArg::Text);
        assert!(args.out.is_none());

        let config = build_config(&args);
        assert!(config.section_delimiters);
        assert!(!config.strict);
        assert_eq!(config.format, OutputFormat::Text);
    }

    #[test]
    fn test_args_flags() {
        let args = Args::try_parse_from([
            "mta-headerdefs",
            "api.h",
            "--out",
            "api.txt",
            "--format",
            "yaml",
            "--no-delimiters",
            "--strict",
        ])
        .unwrap();

        let config = build_config(&args);
        assert_eq!(args.out, Some(PathBuf::from("api.txt")));
        assert_eq!(config.format, OutputFormat::Yaml);
        assert!(!config.section_delimiters);
        assert!(config.strict);
    }

    #[test]
    fn test_header_is_required() {
        assert!(Args::try_parse_from(["mta-headerdefs"]).is_err());
    }

    #[test]
    fn test_diagnostic_line() {
        let diagnostic = Diagnostic {
            severity: Severity::Error,
            line: 4,
            column: 2,
            message: "syntax error near `@@`".to_string(),
        };
        assert_eq!(
            diagnostic_line(Path::new("api.h"), &diagnostic),
            "[ERROR] api.h:4:2: syntax error near `@@`"
        );
    }

    #[test]
    fn test_run_writes_output_file() {
        let dir = TempDir::new().unwrap();
        let header = dir.path().join("api.h");
        let out = dir.path().join("api.txt");
        fs::write(&header, "typedef int myint;\n#define MAX 100\n").unwrap();

        let args = Args::try_parse_from([
            "mta-headerdefs".to_string(),
            header.display().to_string(),
            "--out".to_string(),
            out.display().to_string(),
            "--no-delimiters".to_string(),
        ])
        .unwrap();
        run(&args).unwrap();

        let written = fs::read_to_string(&out).unwrap();
        assert!(written.starts_with("Typedefs:\n\ntypedef int myint;\n"));
        assert!(written.contains("Macros:\n\n#define MAX 100\n"));
    }

    #[test]
    fn test_run_missing_header_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.h");
        let args =
            Args::try_parse_from(["mta-headerdefs".to_string(), missing.display().to_string()])
                .unwrap();

        let err = run(&args).unwrap_err();
        assert!(format!("{:#}", err).contains("Header file not found"));
        assert!(!is_parser_init_failure(&err));
    }
}
