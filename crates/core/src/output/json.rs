//! JSON output formatter

use crate::models::HeaderReport;
use crate::output::FormatError;

/// Format a report as pretty-printed JSON
pub fn format_json(report: &HeaderReport) -> Result<String, FormatError> {
    serde_json::to_string_pretty(report).map_err(FormatError::from)
}
