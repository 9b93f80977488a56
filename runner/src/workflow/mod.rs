//! Workflow engine.
//!
//! ```text
//! process_workflow
//!   ├─ check bindings against the declared parameters
//!   └─ execute_operations (declared order)
//!        ├─ fileTypeValidation        → operations::validate_file_type
//!        ├─ rowCountValidation        → operations::validate_row_count
//!        └─ fieldsetSchemaValidation  → match_fields + validate_fieldset
//! ```
//!
//! [`pipeline`] wraps the engine for files on disk: reading, baseline checks
//! and a serializable report.

pub mod executor;
pub mod operations;
pub mod pipeline;

use crate::error::{MissingParameterError, RunError, RunResult};
use crate::logs::{RunLog, LOG_BROADCASTER};
use crate::params::ParamBinding;
use crate::parser::WorkflowFile;
use crate::schema::{ValidationFailure, WorkflowSchema};

pub use executor::{execute_operation, execute_operations};
pub use pipeline::{
    check_workflow_file, run_workflow_file, run_workflow_file_with_log,
    run_workflow_file_with_schema,
};

/// Check that bindings fit the schema's parameter declarations.
///
/// Every bound name must be declared, and every required parameter bound.
pub fn check_bindings(schema: &WorkflowSchema, binding: &ParamBinding) -> RunResult<()> {
    for name in binding.names() {
        if schema.param(name).is_err() {
            return Err(RunError::UndeclaredParameter(name.to_string()));
        }
    }

    for param in schema.required_params() {
        if binding.get(&param.name).is_none() {
            return Err(MissingParameterError::new(&param.name).into());
        }
    }

    Ok(())
}

/// Validate one file against one schema with one set of bindings.
///
/// Returns every failure in evaluation order; an empty list means the file
/// passed. Configuration errors abort the run and produce no list.
/// Progress goes to subscribers of the global broadcaster only.
pub fn process_workflow(
    file: &WorkflowFile,
    binding: &ParamBinding,
    schema: &WorkflowSchema,
) -> RunResult<Vec<ValidationFailure>> {
    process_workflow_with_log(file, binding, schema, &RunLog::silent(&LOG_BROADCASTER))
}

/// [`process_workflow`] reporting progress to `log`.
pub fn process_workflow_with_log(
    file: &WorkflowFile,
    binding: &ParamBinding,
    schema: &WorkflowSchema,
    log: &RunLog,
) -> RunResult<Vec<ValidationFailure>> {
    check_bindings(schema, binding)?;
    execute_operations(schema, file, binding, log)
}
