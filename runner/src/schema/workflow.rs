//! The validated, immutable workflow schema.
//!
//! Every dangling reference is rejected here, at construction, so a
//! [`WorkflowSchema`] can be shared read-only across any number of runs.

use chrono::format::{Item, StrftimeItems};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use super::{
    document::validate_document, DataType, FieldsetSchema, Operation, ParamDeclaration,
    SchemaDocument,
};
use crate::error::{SchemaError, SchemaReferenceError, SchemaResult};
use crate::params::ValueOrParam;

/// Fieldset schemas, operations and parameter declarations keyed by name.
#[derive(Debug, Clone)]
pub struct WorkflowSchema {
    operations: Vec<Operation>,
    fieldsets: BTreeMap<String, FieldsetSchema>,
    params: BTreeMap<String, ParamDeclaration>,
}

impl WorkflowSchema {
    /// Build a schema from a deserialized document, checking every reference.
    pub fn new(document: SchemaDocument) -> SchemaResult<Self> {
        let mut fieldsets = BTreeMap::new();
        for fieldset in document.fieldset_schemas {
            if fieldsets.contains_key(&fieldset.name) {
                return Err(SchemaError::DuplicateFieldset(fieldset.name));
            }
            fieldsets.insert(fieldset.name.clone(), fieldset);
        }

        let mut params = BTreeMap::new();
        for param in document.params {
            if params.contains_key(&param.name) {
                return Err(SchemaError::DuplicateParam(param.name));
            }
            params.insert(param.name.clone(), param);
        }

        let schema = Self {
            operations: document.operations,
            fieldsets,
            params,
        };
        schema.check_fieldsets()?;
        schema.check_operations()?;
        Ok(schema)
    }

    /// Parse, structurally validate and construct a schema from JSON text.
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Structurally validate and construct a schema from a JSON value.
    pub fn from_value(value: Value) -> SchemaResult<Self> {
        validate_document(&value)?;
        let document: SchemaDocument = serde_json::from_value(value)?;
        Self::new(document)
    }

    /// Operations in declared order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn fieldset_schema(&self, name: &str) -> Result<&FieldsetSchema, SchemaReferenceError> {
        self.fieldsets
            .get(name)
            .ok_or_else(|| SchemaReferenceError::FieldsetSchema(name.to_string()))
    }

    pub fn param(&self, name: &str) -> Result<&ParamDeclaration, SchemaReferenceError> {
        self.params
            .get(name)
            .ok_or_else(|| SchemaReferenceError::Param(name.to_string()))
    }

    pub fn fieldset_schemas(&self) -> impl Iterator<Item = &FieldsetSchema> {
        self.fieldsets.values()
    }

    pub fn params(&self) -> impl Iterator<Item = &ParamDeclaration> {
        self.params.values()
    }

    pub fn required_params(&self) -> impl Iterator<Item = &ParamDeclaration> {
        self.params.values().filter(|p| p.required)
    }

    fn check_fieldsets(&self) -> SchemaResult<()> {
        for fieldset in self.fieldsets.values() {
            for field in &fieldset.fields {
                if let Some(name) = field.allowed_values.as_ref().and_then(|v| v.param_name()) {
                    self.param(name)?;
                }
                if let DataType::Timestamp { date_time_format } = &field.data_type_validation {
                    let invalid = StrftimeItems::new(date_time_format)
                        .any(|item| matches!(item, Item::Error));
                    if invalid {
                        return Err(SchemaError::Document {
                            errors: vec![format!(
                                "Field '{}' in fieldset '{}' has an invalid dateTimeFormat '{}'",
                                field.name, fieldset.name, date_time_format
                            )],
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn check_operations(&self) -> SchemaResult<()> {
        for operation in &self.operations {
            match operation {
                Operation::FileTypeValidation(_) => {}
                Operation::RowCountValidation(op) => {
                    if let (Some(min), Some(max)) = (op.min_row_count, op.max_row_count) {
                        if min > max {
                            return Err(SchemaError::InvalidRowBounds {
                                title: op.title.clone(),
                                min,
                                max,
                            });
                        }
                    }
                }
                Operation::FieldsetSchemaValidation(op) => match &op.fieldset_schema {
                    ValueOrParam::Literal(name) => {
                        self.fieldset_schema(name)?;
                    }
                    ValueOrParam::Param(r) => {
                        self.param(&r.param_id)?;
                    }
                },
            }
        }
        Ok(())
    }
}

/// Load a workflow schema from a JSON file.
pub fn load_workflow_schema<P: AsRef<Path>>(path: P) -> SchemaResult<WorkflowSchema> {
    let content = std::fs::read_to_string(path.as_ref())?;
    WorkflowSchema::from_json(&content)
}
