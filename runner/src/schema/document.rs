//! JSON Schema validation of workflow schema documents.
//!
//! The document shape is checked against an embedded JSON Schema (Draft 7)
//! before typed deserialization, so an author sees every structural problem
//! in one pass instead of serde's first error.
//!
//! The schema is embedded at compile time from
//! `schemas/workflow-schema.json`.

use serde_json::Value;

use crate::error::SchemaError;

const WORKFLOW_SCHEMA: &str = include_str!("../../schemas/workflow-schema.json");

/// Validate a JSON value against a JSON schema.
///
/// Returns every validation error message when `data` does not match.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid JSON schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a raw workflow schema document against the embedded schema.
pub fn validate_document(document: &Value) -> Result<(), SchemaError> {
    let schema: Value = serde_json::from_str(WORKFLOW_SCHEMA)?;
    validate(&schema, document).map_err(|errors| SchemaError::Document { errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embedded_schema_is_valid_json() {
        assert!(serde_json::from_str::<Value>(WORKFLOW_SCHEMA).is_ok());
    }

    #[test]
    fn test_minimal_document() {
        let doc = json!({ "fieldsetSchemas": [], "operations": [], "params": [] });
        assert!(validate_document(&doc).is_ok());
    }

    #[test]
    fn test_unknown_keys_allowed() {
        let doc = json!({
            "version": "0.1",
            "fieldsetSchemas": [],
            "operations": [
                {
                    "type": "fileTypeValidation",
                    "title": "csv",
                    "expectedFileType": "csv",
                    "ui": {}
                }
            ],
            "params": []
        });
        assert!(validate_document(&doc).is_ok());
    }

    #[test]
    fn test_reports_every_problem() {
        let doc = json!({
            "fieldsetSchemas": [
                {
                    "name": "grades",
                    "orderMatters": "yes",
                    "allowExtraColumns": "sometimes",
                    "fields": []
                }
            ],
            "operations": [
                { "type": "fileTypeValidation", "title": "csv" }
            ],
            "params": []
        });

        match validate_document(&doc) {
            Err(SchemaError::Document { errors }) => assert!(errors.len() >= 3, "{:?}", errors),
            other => panic!("expected document errors, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_top_level_key() {
        let doc = json!({ "fieldsetSchemas": [], "operations": [] });
        assert!(matches!(
            validate_document(&doc),
            Err(SchemaError::Document { .. })
        ));
    }

    #[test]
    fn test_timestamp_requires_format() {
        let doc = json!({
            "fieldsetSchemas": [{
                "name": "dates",
                "orderMatters": false,
                "allowExtraColumns": "anywhere",
                "fields": [{
                    "name": "day",
                    "caseSensitive": true,
                    "required": true,
                    "allowEmptyValues": false,
                    "allowedValues": null,
                    "dataTypeValidation": { "dataType": "timestamp" }
                }]
            }],
            "operations": [],
            "params": []
        });
        assert!(validate_document(&doc).is_err());
    }
}
