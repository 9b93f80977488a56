//! # Workflow Runner - schema-driven validation of CSV files
//!
//! A workflow schema declares reusable fieldset schemas (column groups with
//! per-field rules), an ordered list of validation operations and the
//! parameters a run needs. The runner checks one tabular file against one
//! schema and returns every failure it finds.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Operations │────▶│   Report    │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (+ params)  │     │ (failures)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                ▲
//!                                   ┌────────────┴────────────┐
//!                                   │     WorkflowSchema      │
//!                                   │ (JSON, checked on load) │
//!                                   └─────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use workflow_runner::{run_workflow_file, ParamBinding, ParamValue, RunOptions};
//!
//! let binding = ParamBinding::new()
//!     .with("allowed_subjects", ParamValue::list(["Math", "History"]));
//! let report = run_workflow_file("schema.json", "grades.csv", &binding, &RunOptions::default())?;
//! for failure in &report.failures {
//!     println!("{}", failure);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`schema`] - Schema document, loading and the validated [`WorkflowSchema`]
//! - [`params`] - Parameter values, bindings and resolution
//! - [`parser`] - CSV reading with auto-detection
//! - [`validation`] - Field matching and cell validation
//! - [`workflow`] - Operation executor, engine and file pipeline
//! - [`report`] - Serializable run report
//! - [`config`] - Run options
//! - [`logs`] - Structured run events and their broadcasting

// Core modules
pub mod error;
pub mod params;
pub mod schema;

// Input
pub mod config;
pub mod parser;

// Engine
pub mod validation;
pub mod workflow;

// Output
pub mod logs;
pub mod report;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    BindingFileError,
    CsvError,
    MissingParameterError,
    RunError,
    SchemaError,
    SchemaReferenceError,
    WorkflowError,
};

// =============================================================================
// Re-exports - Schema
// =============================================================================

pub use schema::{
    load_workflow_schema,
    DataType,
    ExtraColumnsPolicy,
    Field,
    FieldsetSchema,
    Operation,
    ParamDeclaration,
    SchemaDocument,
    ValidationFailure,
    WorkflowSchema,
};

// =============================================================================
// Re-exports - Parameters
// =============================================================================

pub use params::{load_binding, resolve, ParamBinding, ParamValue, ValueOrParam};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    parse_bytes_auto,
    parse_csv_str,
    read_workflow_file,
    CsvData,
    ParseResult,
    WorkflowFile,
};

// =============================================================================
// Re-exports - Engine
// =============================================================================

pub use workflow::{
    check_workflow_file,
    process_workflow,
    process_workflow_with_log,
    run_workflow_file,
    run_workflow_file_with_log,
    run_workflow_file_with_schema,
};

pub use logs::{LogBroadcaster, LogEntry, RunEvent, RunLog, LOG_BROADCASTER};

pub use config::RunOptions;
pub use report::WorkflowReport;
