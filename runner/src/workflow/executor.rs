//! Operation executor.
//!
//! Runs every operation in declared order and concatenates their failures.
//! A failing operation never stops the ones after it; only a configuration
//! error ends the run early.

use super::operations::{validate_fieldset_schema, validate_file_type, validate_row_count};
use crate::error::RunResult;
use crate::logs::{RunEvent, RunLog};
use crate::params::ParamBinding;
use crate::parser::WorkflowFile;
use crate::schema::{Operation, ValidationFailure, WorkflowSchema};

/// Dispatch one operation to its handler.
pub fn execute_operation(
    schema: &WorkflowSchema,
    operation: &Operation,
    file: &WorkflowFile,
    binding: &ParamBinding,
) -> RunResult<Vec<ValidationFailure>> {
    match operation {
        Operation::FileTypeValidation(op) => Ok(validate_file_type(file, op)),
        Operation::RowCountValidation(op) => Ok(validate_row_count(file, op)),
        Operation::FieldsetSchemaValidation(op) => {
            validate_fieldset_schema(schema, file, op, binding)
        }
    }
}

/// Run all operations of `schema` against `file`, reporting progress to `log`.
pub fn execute_operations(
    schema: &WorkflowSchema,
    file: &WorkflowFile,
    binding: &ParamBinding,
    log: &RunLog,
) -> RunResult<Vec<ValidationFailure>> {
    let total = schema.operations().len();
    let mut failures = Vec::new();

    for (i, operation) in schema.operations().iter().enumerate() {
        log.emit(RunEvent::OperationStarted {
            index: i + 1,
            total,
            title: operation.title().to_string(),
            kind: operation.kind().to_string(),
        });

        let found = execute_operation(schema, operation, file, binding)?;
        log.emit(RunEvent::OperationFinished {
            index: i + 1,
            title: operation.title().to_string(),
            failures: found.len(),
        });
        failures.extend(found);
    }

    Ok(failures)
}
