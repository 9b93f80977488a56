//! Error types for the workflow runner.
//!
//! Configuration problems and data problems never share a type:
//!
//! - [`SchemaReferenceError`] - a name that points at nothing in the schema
//! - [`MissingParameterError`] - a parameter the run needs but was not given
//! - [`SchemaError`] - the workflow schema document cannot be loaded
//! - [`RunError`] - the schema/binding pair cannot be run
//! - [`BindingFileError`] - a parameter file cannot be read
//! - [`CsvError`] - the input file cannot be tokenized
//! - [`WorkflowError`] - top-level wrapper for the file pipeline and CLI
//!
//! Problems found *in the data* are reported as
//! [`ValidationFailure`](crate::schema::ValidationFailure) values, never as errors.

use thiserror::Error;

// =============================================================================
// Reference Errors
// =============================================================================

/// A schema lookup by name found nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaReferenceError {
    /// No fieldset schema with this name.
    #[error("Fieldset schema '{0}' not found in schema")]
    FieldsetSchema(String),

    /// No parameter declaration with this name.
    #[error("Parameter '{0}' is not declared in schema")]
    Param(String),
}

/// A parameter needed by the run has no binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing value for parameter '{name}'")]
pub struct MissingParameterError {
    pub name: String,
}

impl MissingParameterError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// =============================================================================
// Schema Loading Errors
// =============================================================================

/// Errors while loading and constructing a workflow schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Failed to read the schema file.
    #[error("Failed to read schema: {0}")]
    Io(#[from] std::io::Error),

    /// Schema is not valid JSON or does not match the document types.
    #[error("Invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema document failed structural validation.
    #[error("Schema document is invalid: {}", errors.join("; "))]
    Document { errors: Vec<String> },

    /// Two fieldset schemas share a name.
    #[error("Duplicate fieldset schema name: {0}")]
    DuplicateFieldset(String),

    /// Two parameters share a name.
    #[error("Duplicate parameter name: {0}")]
    DuplicateParam(String),

    /// A row count operation whose minimum exceeds its maximum.
    #[error("Operation '{title}' has minRowCount {min} greater than maxRowCount {max}")]
    InvalidRowBounds { title: String, min: u64, max: u64 },

    /// Dangling reference to a fieldset or parameter.
    #[error(transparent)]
    Reference(#[from] SchemaReferenceError),
}

// =============================================================================
// Run Configuration Errors
// =============================================================================

/// Configuration errors that abort a validation run.
///
/// A run that returns one of these produced no failure list at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// A name resolved at run time points at nothing.
    #[error(transparent)]
    Reference(#[from] SchemaReferenceError),

    /// A referenced or required parameter has no binding.
    #[error(transparent)]
    MissingParameter(#[from] MissingParameterError),

    /// A binding was supplied for a parameter the schema does not declare.
    #[error("Parameter definition for '{0}' not found in schema")]
    UndeclaredParameter(String),

    /// A bound value does not have the shape its use site needs.
    #[error("Parameter '{name}' must be {expected}")]
    ParamShape { name: String, expected: &'static str },
}

// =============================================================================
// Binding File Errors
// =============================================================================

/// Errors while reading parameter values from a JSON file.
#[derive(Debug, Error)]
pub enum BindingFileError {
    #[error("Failed to read parameter file: {0}")]
    Io(#[from] std::io::Error),

    /// Not a JSON object of parameter values.
    #[error("Invalid parameter file: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading the input file.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the file contents.
    #[error("Failed to decode file: {0}")]
    Encoding(String),

    /// Malformed CSV.
    #[error("Invalid CSV format: {0}")]
    Parse(#[from] csv::Error),

    /// Delimiter that cannot be used as a single-byte separator.
    #[error("Invalid delimiter '{0}': must be a single-byte character")]
    InvalidDelimiter(char),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Workflow Errors (top-level)
// =============================================================================

/// Top-level error for running a workflow against a file on disk.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Schema could not be loaded.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Schema and bindings cannot be run.
    #[error("Configuration error: {0}")]
    Run(#[from] RunError),

    /// Input file could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Parameter file could not be read.
    #[error("Parameter error: {0}")]
    Binding(#[from] BindingFileError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for schema loading.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for a validation run.
pub type RunResult<T> = Result<T, RunError>;

/// Result type for CSV reading.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for reading parameter files.
pub type BindingFileResult<T> = Result<T, BindingFileError>;

/// Result type for the file pipeline.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
