//! YAML output formatter

use crate::models::HeaderReport;
use crate::output::FormatError;

/// Format a report as YAML
pub fn format_yaml(report: &HeaderReport) -> Result<String, FormatError> {
    serde_yaml::to_string(report).map_err(FormatError::from)
}
