//! Workflow schema model.
//!
//! A workflow schema document has three top-level lists:
//!
//! - `fieldsetSchemas` - reusable column-group validators ([`FieldsetSchema`])
//! - `operations` - ordered validation steps ([`Operation`])
//! - `params` - run-time inputs ([`ParamDeclaration`])
//!
//! The document types here mirror the JSON shape one-to-one (camelCase keys,
//! unknown keys ignored). [`WorkflowSchema`] is the validated, immutable form
//! the engine runs against.

pub mod document;
pub mod workflow;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::params::ValueOrParam;

pub use document::validate_document;
pub use workflow::{load_workflow_schema, WorkflowSchema};

// =============================================================================
// Document
// =============================================================================

/// The raw schema document, as deserialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    pub fieldset_schemas: Vec<FieldsetSchema>,
    pub operations: Vec<Operation>,
    pub params: Vec<ParamDeclaration>,
}

// =============================================================================
// Fieldsets
// =============================================================================

/// Where columns not claimed by any field may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtraColumnsPolicy {
    /// No extra columns at all.
    No,
    /// Extra columns anywhere.
    Anywhere,
    /// Extra columns only to the right of every schema column.
    OnlyAfterSchemaFields,
}

impl fmt::Display for ExtraColumnsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExtraColumnsPolicy::No => "no",
            ExtraColumnsPolicy::Anywhere => "anywhere",
            ExtraColumnsPolicy::OnlyAfterSchemaFields => "onlyAfterSchemaFields",
        };
        f.write_str(s)
    }
}

/// A named group of per-column rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldsetSchema {
    pub name: String,
    pub order_matters: bool,
    pub allow_extra_columns: ExtraColumnsPolicy,
    pub fields: Vec<Field>,
}

impl FieldsetSchema {
    /// Unordered fieldset that tolerates extra columns anywhere.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            order_matters: false,
            allow_extra_columns: ExtraColumnsPolicy::Anywhere,
            fields,
        }
    }

    pub fn ordered(mut self) -> Self {
        self.order_matters = true;
        self
    }

    pub fn extra_columns(mut self, policy: ExtraColumnsPolicy) -> Self {
        self.allow_extra_columns = policy;
        self
    }
}

/// Rules for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub case_sensitive: bool,
    pub required: bool,
    pub allow_empty_values: bool,
    /// `None` leaves values unconstrained.
    #[serde(default)]
    pub allowed_values: Option<ValueOrParam<Vec<String>>>,
    pub data_type_validation: DataType,
}

impl Field {
    /// Optional, case-sensitive, non-empty string column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            case_sensitive: true,
            required: false,
            allow_empty_values: false,
            allowed_values: None,
            data_type_validation: DataType::String,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    pub fn allow_empty(mut self) -> Self {
        self.allow_empty_values = true;
        self
    }

    pub fn allowed<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = Some(ValueOrParam::Literal(
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn allowed_from_param(mut self, param: impl Into<String>) -> Self {
        self.allowed_values = Some(ValueOrParam::param(param));
        self
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type_validation = data_type;
        self
    }
}

/// The closed set of cell data types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dataType", rename_all = "camelCase")]
pub enum DataType {
    Any,
    String,
    Number,
    Integer,
    Boolean,
    Timestamp {
        #[serde(rename = "dateTimeFormat")]
        date_time_format: String,
    },
}

impl DataType {
    pub fn tag(&self) -> &'static str {
        match self {
            DataType::Any => "any",
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Integer => "integer",
            DataType::Boolean => "boolean",
            DataType::Timestamp { .. } => "timestamp",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Timestamp { date_time_format } => {
                write!(f, "timestamp ({})", date_time_format)
            }
            other => f.write_str(other.tag()),
        }
    }
}

// =============================================================================
// Parameters
// =============================================================================

/// A run-time input declared by the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDeclaration {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Whether every run must bind this parameter.
    pub required: bool,
}

impl ParamDeclaration {
    pub fn new(name: impl Into<String>, required: bool) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            description: None,
            required,
        }
    }
}

// =============================================================================
// Operations
// =============================================================================

/// One step of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Operation {
    FileTypeValidation(FileTypeValidation),
    RowCountValidation(RowCountValidation),
    FieldsetSchemaValidation(FieldsetSchemaValidation),
}

impl Operation {
    pub fn title(&self) -> &str {
        match self {
            Operation::FileTypeValidation(op) => &op.title,
            Operation::RowCountValidation(op) => &op.title,
            Operation::FieldsetSchemaValidation(op) => &op.title,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Operation::FileTypeValidation(_) => "fileTypeValidation",
            Operation::RowCountValidation(_) => "rowCountValidation",
            Operation::FieldsetSchemaValidation(_) => "fieldsetSchemaValidation",
        }
    }
}

/// Check the detected file type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTypeValidation {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub expected_file_type: String,
}

/// Check the number of data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowCountValidation {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub min_row_count: Option<u64>,
    #[serde(default)]
    pub max_row_count: Option<u64>,
}

/// Run a fieldset schema, named literally or through a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldsetSchemaValidation {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fieldset_schema: ValueOrParam<String>,
}

// =============================================================================
// Failures
// =============================================================================

/// One problem found in the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailure {
    pub message: String,
    /// 1-based data row, `None` for file-level problems.
    #[serde(default)]
    pub row_number: Option<usize>,
}

impl ValidationFailure {
    pub fn file_level(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            row_number: None,
        }
    }

    pub fn at_row(row_number: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            row_number: Some(row_number),
        }
    }

    pub fn is_file_level(&self) -> bool {
        self.row_number.is_none()
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row_number {
            Some(row) => write!(f, "Row {}: {}", row, self.message),
            None => f.write_str(&self.message),
        }
    }
}
