//! Run report: the serializable summary of one file checked against one schema.

use serde::{Deserialize, Serialize};

use crate::parser::WorkflowFile;
use crate::schema::ValidationFailure;

/// Outcome of a workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowReport {
    pub file: String,
    pub file_type: Option<String>,
    /// Data rows, header excluded
    pub row_count: usize,
    pub columns: Vec<String>,
    pub passed: bool,
    pub failures: Vec<ValidationFailure>,
    pub file_level_failures: usize,
    pub row_level_failures: usize,
}

impl WorkflowReport {
    pub fn new(file: &WorkflowFile, failures: Vec<ValidationFailure>) -> Self {
        let file_level_failures = failures.iter().filter(|f| f.is_file_level()).count();
        Self {
            file: file.file_name.clone(),
            file_type: file.file_type.clone(),
            row_count: file.data.row_count(),
            columns: file.data.headers.clone(),
            passed: failures.is_empty(),
            file_level_failures,
            row_level_failures: failures.len() - file_level_failures,
            failures,
        }
    }

    /// Failures reported against a given data row.
    pub fn failures_at_row(&self, row_number: usize) -> impl Iterator<Item = &ValidationFailure> {
        self.failures
            .iter()
            .filter(move |f| f.row_number == Some(row_number))
    }

    /// Plain-text rendering for the terminal.
    pub fn to_text(&self) -> String {
        let mut out = format!(
            "{} ({} rows, {} columns): {}\n",
            self.file,
            self.row_count,
            self.columns.len(),
            if self.passed { "PASSED" } else { "FAILED" }
        );

        if !self.passed {
            out.push_str(&format!(
                "{} failure(s): {} file-level, {} row-level\n",
                self.failures.len(),
                self.file_level_failures,
                self.row_level_failures
            ));
            for failure in &self.failures {
                out.push_str(&format!("  - {}\n", failure));
            }
        }

        out
    }
}
