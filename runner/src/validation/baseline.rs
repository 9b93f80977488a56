//! Baseline structural checks run before any operation.
//!
//! These catch files that are malformed as tables regardless of schema:
//! blank headers, duplicate headers and rows with more cells than headers.
//! Short rows are not reported; their missing cells read as blank.

use std::collections::HashSet;

use crate::parser::CsvData;
use crate::schema::ValidationFailure;

pub fn baseline_failures(data: &CsvData) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();

    for (i, header) in data.headers.iter().enumerate() {
        if header.is_empty() {
            failures.push(ValidationFailure::file_level(format!(
                "Column {} has a blank header",
                i + 1
            )));
        } else if !seen.insert(header.as_str()) && reported.insert(header.as_str()) {
            failures.push(ValidationFailure::file_level(format!(
                "Duplicate column header `{}`",
                header
            )));
        }
    }

    let width = data.headers.len();
    for (i, row) in data.rows.iter().enumerate() {
        if row.len() > width {
            failures.push(ValidationFailure::at_row(
                i + 1,
                format!("Row has {} cells but the header has {} columns", row.len(), width),
            ));
        }
    }

    failures
}
