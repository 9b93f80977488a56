//! Fieldset validator: per-cell rules over every data row.

use std::collections::HashSet;

use super::data_type;
use super::matcher::MatchResult;
use crate::error::RunResult;
use crate::params::{resolve, ParamBinding};
use crate::parser::CsvData;
use crate::schema::{Field, FieldsetSchema, ValidationFailure};

/// Resolved allowed values for one field, folded to the field's case rule.
#[derive(Debug, Clone)]
struct AllowedValues {
    values: HashSet<String>,
    case_sensitive: bool,
}

impl AllowedValues {
    fn new(values: Vec<String>, case_sensitive: bool) -> Self {
        let values = if case_sensitive {
            values.into_iter().collect()
        } else {
            values.into_iter().map(|v| v.to_lowercase()).collect()
        };
        Self {
            values,
            case_sensitive,
        }
    }

    fn contains(&self, value: &str) -> bool {
        if self.case_sensitive {
            self.values.contains(value)
        } else {
            self.values.contains(&value.to_lowercase())
        }
    }
}

/// Resolve every field's allowed values once for this run.
fn resolve_allowed_values(
    fieldset: &FieldsetSchema,
    binding: &ParamBinding,
) -> RunResult<Vec<Option<AllowedValues>>> {
    fieldset
        .fields
        .iter()
        .map(|field| {
            field
                .allowed_values
                .as_ref()
                .map(|v| resolve(v, binding).map(|vs| AllowedValues::new(vs, field.case_sensitive)))
                .transpose()
        })
        .collect()
}

/// Validate every row's cells against the fieldset's field rules.
///
/// Unmatched fields are skipped. A blank cell yields at most the
/// not-empty failure; otherwise the allowed-value and data type checks are
/// both evaluated. Failures come row by row, fields in declared order.
///
/// Parameter indirections are resolved for every field up front, so an
/// unbound parameter aborts the run whatever the file contains.
pub fn validate_fieldset(
    fieldset: &FieldsetSchema,
    matched: &MatchResult,
    data: &CsvData,
    binding: &ParamBinding,
) -> RunResult<Vec<ValidationFailure>> {
    let allowed = resolve_allowed_values(fieldset, binding)?;
    let mut failures = Vec::new();

    for row in 0..data.row_count() {
        let row_number = row + 1;
        for (i, field) in fieldset.fields.iter().enumerate() {
            let Some(column) = matched.column(i) else {
                continue;
            };
            let value = data.cell(row, column);
            check_cell(field, allowed[i].as_ref(), value, row_number, &mut failures);
        }
    }

    Ok(failures)
}

fn check_cell(
    field: &Field,
    allowed: Option<&AllowedValues>,
    value: &str,
    row_number: usize,
    failures: &mut Vec<ValidationFailure>,
) {
    if value.trim().is_empty() {
        if !field.allow_empty_values {
            failures.push(ValidationFailure::at_row(
                row_number,
                format!("`{}` must not be empty", field.name),
            ));
        }
        return;
    }

    if let Some(allowed) = allowed {
        if !allowed.contains(value) {
            failures.push(ValidationFailure::at_row(
                row_number,
                format!("`{}` value `{}` is not an allowed value", field.name, value),
            ));
        }
    }

    if !data_type::is_valid(&field.data_type_validation, value) {
        failures.push(ValidationFailure::at_row(
            row_number,
            format!(
                "`{}` value `{}` is not a valid `{}`",
                field.name, value, field.data_type_validation
            ),
        ));
    }
}
