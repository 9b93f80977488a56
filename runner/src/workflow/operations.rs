//! Handlers for each operation type.
//!
//! Every handler is a pure function of its operation config, the file and the
//! parameter binding. Data problems come back as failures; only broken
//! configuration comes back as an error.

use crate::error::RunResult;
use crate::params::{resolve, ParamBinding};
use crate::parser::WorkflowFile;
use crate::schema::{
    FieldsetSchemaValidation, FileTypeValidation, RowCountValidation, ValidationFailure,
    WorkflowSchema,
};
use crate::validation::{match_fields, validate_fieldset};

fn normalize_file_type(file_type: &str) -> String {
    file_type.trim().trim_start_matches('.').to_lowercase()
}

/// Compare the detected file type with the expected one, ignoring case and a
/// leading dot.
pub fn validate_file_type(file: &WorkflowFile, op: &FileTypeValidation) -> Vec<ValidationFailure> {
    let expected = normalize_file_type(&op.expected_file_type);
    let matches = file
        .file_type
        .as_deref()
        .map(|detected| normalize_file_type(detected) == expected)
        .unwrap_or(false);

    if matches {
        Vec::new()
    } else {
        vec![ValidationFailure::file_level(format!(
            "File `{}` does not have the expected file type `{}`",
            file.file_name, expected
        ))]
    }
}

/// Check the number of data rows against the configured bounds.
pub fn validate_row_count(file: &WorkflowFile, op: &RowCountValidation) -> Vec<ValidationFailure> {
    let count = file.data.row_count() as u64;

    let message = match (op.min_row_count, op.max_row_count) {
        (Some(min), _) if count < min => Some(format!(
            "File has {} data rows, fewer than the minimum of {}",
            count, min
        )),
        (_, Some(max)) if count > max => Some(format!(
            "File has {} data rows, more than the maximum of {}",
            count, max
        )),
        _ => None,
    };

    message
        .map(ValidationFailure::file_level)
        .into_iter()
        .collect()
}

/// Resolve the fieldset, match its fields to the columns, validate the rows.
pub fn validate_fieldset_schema(
    schema: &WorkflowSchema,
    file: &WorkflowFile,
    op: &FieldsetSchemaValidation,
    binding: &ParamBinding,
) -> RunResult<Vec<ValidationFailure>> {
    let name = resolve(&op.fieldset_schema, binding)?;
    let fieldset = schema.fieldset_schema(&name)?;

    let matched = match_fields(fieldset, &file.data.headers);
    let mut failures = matched.failures.clone();
    failures.extend(validate_fieldset(fieldset, &matched, &file.data, binding)?);

    Ok(failures)
}
